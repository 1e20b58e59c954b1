//! Domain service for catalog items.

use thiserror::Error;

use crate::domain::ProductId;
use crate::models::{CatalogItem, NewItem};

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Product {0} not found")]
    NotFound(ProductId),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for CatalogError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for CatalogError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(format!("{err:#}"))
    }
}

/// Result of a full-record replace. The update is issued without an
/// existence check, so `rows_affected` is 0 when `item.id` does not exist.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateOutcome {
    pub item: CatalogItem,
    pub rows_affected: u64,
}

#[async_trait::async_trait]
pub trait CatalogService: Send + Sync {
    /// All items, ascending by id. Empty when the catalog is empty.
    async fn list(&self) -> Result<Vec<CatalogItem>, CatalogError>;

    /// Items whose category equals `category` exactly.
    async fn list_by_category(&self, category: &str) -> Result<Vec<CatalogItem>, CatalogError>;

    /// # Errors
    ///
    /// Returns [`CatalogError::NotFound`] when no item has this id.
    async fn get(&self, id: ProductId) -> Result<CatalogItem, CatalogError>;

    async fn create(&self, item: NewItem) -> Result<CatalogItem, CatalogError>;

    async fn update(&self, id: ProductId, item: NewItem) -> Result<UpdateOutcome, CatalogError>;

    /// Returns the number of rows removed; an unknown id is not an error.
    async fn delete(&self, id: ProductId) -> Result<u64, CatalogError>;
}

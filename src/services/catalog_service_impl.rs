//! `SeaORM` implementation of the `CatalogService` trait.

use async_trait::async_trait;
use tracing::{info, warn};

use crate::db::Store;
use crate::domain::ProductId;
use crate::models::{CatalogItem, NewItem};
use crate::services::catalog_service::{CatalogError, CatalogService, UpdateOutcome};

pub struct SeaOrmCatalogService {
    store: Store,
}

impl SeaOrmCatalogService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }
}

#[async_trait]
impl CatalogService for SeaOrmCatalogService {
    async fn list(&self) -> Result<Vec<CatalogItem>, CatalogError> {
        Ok(self.store.list_products().await?)
    }

    async fn list_by_category(&self, category: &str) -> Result<Vec<CatalogItem>, CatalogError> {
        Ok(self.store.list_products_by_category(category).await?)
    }

    async fn get(&self, id: ProductId) -> Result<CatalogItem, CatalogError> {
        self.store
            .get_product(id)
            .await?
            .ok_or(CatalogError::NotFound(id))
    }

    async fn create(&self, item: NewItem) -> Result<CatalogItem, CatalogError> {
        let created = self.store.add_product(item).await?;
        info!(product_id = %created.id, name = %created.name, "Product created");
        Ok(created)
    }

    async fn update(&self, id: ProductId, item: NewItem) -> Result<UpdateOutcome, CatalogError> {
        let rows_affected = self.store.update_product(id, &item).await?;

        if rows_affected == 0 {
            warn!(product_id = %id, "Update matched no product");
        } else {
            info!(product_id = %id, rows_affected, "Product updated");
        }

        Ok(UpdateOutcome {
            item: item.with_id(id),
            rows_affected,
        })
    }

    async fn delete(&self, id: ProductId) -> Result<u64, CatalogError> {
        let rows_affected = self.store.remove_product(id).await?;

        if rows_affected == 0 {
            warn!(product_id = %id, "Delete matched no product");
        } else {
            info!(product_id = %id, rows_affected, "Product deleted");
        }

        Ok(rows_affected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn service() -> SeaOrmCatalogService {
        let store = Store::with_pool_options("sqlite::memory:", 1, 1).await.unwrap();
        SeaOrmCatalogService::new(store)
    }

    fn pears() -> NewItem {
        NewItem {
            name: "Pears".into(),
            category: "Fruit".into(),
            price: 50.0,
            quantity: 10,
        }
    }

    #[tokio::test]
    async fn empty_catalog_lists_nothing() {
        let service = service().await;
        assert!(service.list().await.unwrap().is_empty());
        assert!(service.list_by_category("Unknown").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn created_item_reads_back_equal() {
        let service = service().await;
        let created = service.create(pears()).await.unwrap();

        let fetched = service.get(created.id).await.unwrap();
        assert_eq!(fetched, pears().with_id(created.id));
    }

    #[tokio::test]
    async fn negative_values_are_stored_as_is() {
        let service = service().await;
        let item = NewItem {
            price: -1.25,
            quantity: -4,
            ..pears()
        };
        let created = service.create(item.clone()).await.unwrap();
        assert_eq!(service.get(created.id).await.unwrap(), item.with_id(created.id));
    }

    #[tokio::test]
    async fn get_unknown_is_not_found() {
        let service = service().await;
        let err = service.get(ProductId::new(404)).await.unwrap_err();
        assert!(matches!(err, CatalogError::NotFound(id) if id.value() == 404));
    }

    #[tokio::test]
    async fn update_replaces_all_fields() {
        let service = service().await;
        let created = service.create(pears()).await.unwrap();

        let replacement = NewItem {
            name: "Plums".into(),
            category: "Stone fruit".into(),
            price: 12.5,
            quantity: 1,
        };
        let outcome = service.update(created.id, replacement.clone()).await.unwrap();
        assert_eq!(outcome.rows_affected, 1);
        assert_eq!(outcome.item, replacement.clone().with_id(created.id));
        assert_eq!(service.get(created.id).await.unwrap(), outcome.item);
        assert_eq!(service.list_by_category("Stone fruit").await.unwrap().len(), 1);
    }

    // Update and delete do not check existence first; an unknown id
    // "succeeds" with zero rows affected.
    #[tokio::test]
    async fn unknown_id_mutations_report_zero_rows() {
        let service = service().await;
        let missing = ProductId::new(777);

        let outcome = service.update(missing, pears()).await.unwrap();
        assert_eq!(outcome.rows_affected, 0);
        assert_eq!(outcome.item.id, missing);
        assert!(service.get(missing).await.is_err());

        assert_eq!(service.delete(missing).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn delete_removes_item() {
        let service = service().await;
        let created = service.create(pears()).await.unwrap();

        assert_eq!(service.delete(created.id).await.unwrap(), 1);
        assert!(matches!(
            service.get(created.id).await,
            Err(CatalogError::NotFound(_))
        ));
    }
}

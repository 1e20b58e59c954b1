use serde::{Deserialize, Serialize};

use crate::domain::ProductId;

/// A priced, quantified inventory record as stored.
///
/// Price and quantity are intended to be non-negative but are not checked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogItem {
    pub id: ProductId,
    pub name: String,
    pub category: String,
    pub price: f64,
    pub quantity: i64,
}

/// The four mutable fields of a catalog item, as submitted for create or
/// full-record replace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewItem {
    pub name: String,
    pub category: String,
    pub price: f64,
    pub quantity: i64,
}

impl NewItem {
    #[must_use]
    pub fn with_id(self, id: ProductId) -> CatalogItem {
        CatalogItem {
            id,
            name: self.name,
            category: self.category,
            price: self.price,
            quantity: self.quantity,
        }
    }
}

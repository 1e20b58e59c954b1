use crate::domain::ProductId;
use crate::entities::{prelude::*, products};
use crate::models::{CatalogItem, NewItem};
use anyhow::{Context, Result};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
    sea_query::Expr,
};
use tracing::debug;

/// Repository for catalog item operations
pub struct ProductRepository {
    conn: DatabaseConnection,
}

impl ProductRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    fn map_model(m: products::Model) -> CatalogItem {
        CatalogItem {
            id: ProductId::new(m.id),
            name: m.name,
            category: m.category,
            price: m.price,
            quantity: m.quantity,
        }
    }

    pub async fn count(&self) -> Result<u64> {
        Products::find()
            .count(&self.conn)
            .await
            .context("Failed to count products")
    }

    pub async fn list(&self) -> Result<Vec<CatalogItem>> {
        let rows = Products::find()
            .order_by_asc(products::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to list products")?;

        Ok(rows.into_iter().map(Self::map_model).collect())
    }

    /// Exact, case-sensitive category match.
    pub async fn list_by_category(&self, category: &str) -> Result<Vec<CatalogItem>> {
        let rows = Products::find()
            .filter(products::Column::Category.eq(category))
            .order_by_asc(products::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to list products by category")?;

        Ok(rows.into_iter().map(Self::map_model).collect())
    }

    pub async fn get(&self, id: ProductId) -> Result<Option<CatalogItem>> {
        let row = Products::find_by_id(id.value())
            .one(&self.conn)
            .await
            .context("Failed to query product by ID")?;

        Ok(row.map(Self::map_model))
    }

    pub async fn insert(&self, item: NewItem) -> Result<CatalogItem> {
        let active_model = products::ActiveModel {
            name: Set(item.name.clone()),
            category: Set(item.category.clone()),
            price: Set(item.price),
            quantity: Set(item.quantity),
            ..Default::default()
        };

        let res = Products::insert(active_model)
            .exec(&self.conn)
            .await
            .context("Failed to insert product")?;

        debug!(id = res.last_insert_id, "Inserted product");
        Ok(item.with_id(ProductId::new(res.last_insert_id)))
    }

    /// Overwrites all four mutable fields of the row with `id`.
    /// Returns the number of rows changed, which is 0 for an unknown id.
    pub async fn update(&self, id: ProductId, item: &NewItem) -> Result<u64> {
        let result = Products::update_many()
            .col_expr(products::Column::Name, Expr::value(item.name.clone()))
            .col_expr(products::Column::Category, Expr::value(item.category.clone()))
            .col_expr(products::Column::Price, Expr::value(item.price))
            .col_expr(products::Column::Quantity, Expr::value(item.quantity))
            .filter(products::Column::Id.eq(id.value()))
            .exec(&self.conn)
            .await
            .context("Failed to update product")?;

        Ok(result.rows_affected)
    }

    /// Returns the number of rows removed, which is 0 for an unknown id.
    pub async fn delete(&self, id: ProductId) -> Result<u64> {
        let result = Products::delete_by_id(id.value())
            .exec(&self.conn)
            .await
            .context("Failed to delete product")?;

        Ok(result.rows_affected)
    }
}

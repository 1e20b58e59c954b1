use crate::config::SecurityConfig;
use crate::domain::ProductId;
use crate::models::{Account, CatalogItem, NewAccount, NewItem};
use anyhow::{Context, Result};
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use std::path::Path;
use std::time::Duration;
use tracing::info;

pub mod migrator;
pub mod repositories;
pub mod seed;

/// Handle to the relational store. Cheap to clone; every clone shares the pool.
#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        if !db_url.contains(":memory:") {
            let path_str = db_url
                .trim_start_matches("sqlite://")
                .trim_start_matches("sqlite:");
            let path_str = path_str.split('?').next().unwrap_or(path_str);
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.with_context(|| {
                    format!("Failed to create database directory: {}", parent.display())
                })?;
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)
                    .with_context(|| format!("Failed to create database file: {path_str}"))?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    #[must_use]
    pub fn user_repo(&self) -> repositories::user::UserRepository {
        repositories::user::UserRepository::new(self.conn.clone())
    }

    #[must_use]
    pub fn product_repo(&self) -> repositories::product::ProductRepository {
        repositories::product::ProductRepository::new(self.conn.clone())
    }

    // Accounts

    pub async fn email_exists(&self, email: &str) -> Result<bool> {
        self.user_repo().email_exists(email).await
    }

    pub async fn find_account_with_hash(&self, email: &str) -> Result<Option<(Account, String)>> {
        self.user_repo().find_by_email_with_hash(email).await
    }

    pub async fn create_account(
        &self,
        account: NewAccount,
        security: &SecurityConfig,
    ) -> Result<Account> {
        self.user_repo().insert(account, security).await
    }

    // Catalog

    pub async fn list_products(&self) -> Result<Vec<CatalogItem>> {
        self.product_repo().list().await
    }

    pub async fn list_products_by_category(&self, category: &str) -> Result<Vec<CatalogItem>> {
        self.product_repo().list_by_category(category).await
    }

    pub async fn get_product(&self, id: ProductId) -> Result<Option<CatalogItem>> {
        self.product_repo().get(id).await
    }

    pub async fn add_product(&self, item: NewItem) -> Result<CatalogItem> {
        self.product_repo().insert(item).await
    }

    pub async fn update_product(&self, id: ProductId, item: &NewItem) -> Result<u64> {
        self.product_repo().update(id, item).await
    }

    pub async fn remove_product(&self, id: ProductId) -> Result<u64> {
        self.product_repo().delete(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn memory_store() -> Store {
        Store::with_pool_options("sqlite::memory:", 1, 1).await.unwrap()
    }

    fn item(name: &str, category: &str) -> NewItem {
        NewItem {
            name: name.into(),
            category: category.into(),
            price: 1.5,
            quantity: 3,
        }
    }

    #[tokio::test]
    async fn products_list_in_id_order() {
        let store = memory_store().await;
        store.ping().await.unwrap();

        let a = store.add_product(item("A", "X")).await.unwrap();
        let b = store.add_product(item("B", "Y")).await.unwrap();
        let c = store.add_product(item("C", "X")).await.unwrap();

        let all = store.list_products().await.unwrap();
        assert_eq!(all, vec![a.clone(), b, c.clone()]);

        let xs = store.list_products_by_category("X").await.unwrap();
        assert_eq!(xs, vec![a, c]);
        assert!(store.list_products_by_category("x").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn update_and_delete_report_rows_affected() {
        let store = memory_store().await;
        let created = store.add_product(item("A", "X")).await.unwrap();

        let rows = store
            .update_product(created.id, &item("A2", "Z"))
            .await
            .unwrap();
        assert_eq!(rows, 1);
        let fetched = store.get_product(created.id).await.unwrap().unwrap();
        assert_eq!(fetched.name, "A2");
        assert_eq!(fetched.category, "Z");

        let missing = ProductId::new(9999);
        assert_eq!(store.update_product(missing, &item("n", "c")).await.unwrap(), 0);
        assert_eq!(store.remove_product(missing).await.unwrap(), 0);
        assert_eq!(store.remove_product(created.id).await.unwrap(), 1);
        assert!(store.get_product(created.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn unusable_database_directory_is_reported() {
        let blocker = std::env::temp_dir().join(format!("stockroom-db-{}", uuid::Uuid::new_v4()));
        std::fs::write(&blocker, b"not a directory").unwrap();
        let url = format!("sqlite:{}/inner/app.db", blocker.display());

        let err = Store::with_pool_options(&url, 1, 1).await.err().unwrap();
        assert!(err.to_string().contains("Failed to create database directory"));

        std::fs::remove_file(&blocker).ok();
    }

    #[tokio::test]
    async fn duplicate_email_hits_unique_constraint() {
        let store = memory_store().await;
        let security = SecurityConfig {
            argon2_memory_cost_kib: 1024,
            argon2_time_cost: 1,
            argon2_parallelism: 1,
        };
        let account = NewAccount {
            name: "A".into(),
            email: "a@x".into(),
            password: "pw".into(),
            role: crate::domain::Role::Standard,
        };

        store.create_account(account.clone(), &security).await.unwrap();
        assert!(store.email_exists("a@x").await.unwrap());
        assert!(!store.email_exists("A@x").await.unwrap());

        let err = store.create_account(account, &security).await.unwrap_err();
        let db_err = err.downcast_ref::<sea_orm::DbErr>().unwrap();
        assert!(matches!(
            db_err.sql_err(),
            Some(sea_orm::SqlErr::UniqueConstraintViolation(_))
        ));
    }
}

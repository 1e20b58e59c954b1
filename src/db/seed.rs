//! Fixed sample rows inserted on first boot for local development.

use anyhow::Result;
use tracing::info;

use super::Store;
use crate::config::SecurityConfig;
use crate::domain::Role;
use crate::models::{NewAccount, NewItem};

const SAMPLE_PRODUCTS: &[(&str, &str, f64, i64)] = &[
    ("Apples", "Fruit", 89.99, 100),
    ("Milk", "Dairy", 75.50, 50),
    ("Bread", "Bakery", 45.00, 30),
];

const SAMPLE_ACCOUNTS: &[(&str, &str, &str, Role)] = &[
    ("Admin User", "admin@mail.ru", "admin123", Role::Privileged),
    ("Regular User", "user@mail.ru", "user123", Role::Standard),
    ("Cat User", "cat@bsu.ru", "87654321", Role::Standard),
];

/// Inserts the sample rows into each table that is still empty.
pub async fn seed_if_empty(store: &Store, security: &SecurityConfig) -> Result<()> {
    let products = store.product_repo();
    if products.count().await? == 0 {
        for &(name, category, price, quantity) in SAMPLE_PRODUCTS {
            products
                .insert(NewItem {
                    name: name.to_string(),
                    category: category.to_string(),
                    price,
                    quantity,
                })
                .await?;
        }
        info!(count = SAMPLE_PRODUCTS.len(), "Seeded sample products");
    }

    let users = store.user_repo();
    if users.count().await? == 0 {
        for &(name, email, password, role) in SAMPLE_ACCOUNTS {
            users
                .insert(
                    NewAccount {
                        name: name.to_string(),
                        email: email.to_string(),
                        password: password.to_string(),
                        role,
                    },
                    security,
                )
                .await?;
        }
        info!(count = SAMPLE_ACCOUNTS.len(), "Seeded sample accounts");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn seeds_once() {
        let store = Store::with_pool_options("sqlite::memory:", 1, 1).await.unwrap();
        let security = SecurityConfig {
            argon2_memory_cost_kib: 1024,
            argon2_time_cost: 1,
            argon2_parallelism: 1,
        };

        seed_if_empty(&store, &security).await.unwrap();
        seed_if_empty(&store, &security).await.unwrap();

        assert_eq!(store.product_repo().count().await.unwrap(), 3);
        assert_eq!(store.user_repo().count().await.unwrap(), 3);

        let (admin, _) = store
            .find_account_with_hash("admin@mail.ru")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(admin.role, Role::Privileged);
    }
}

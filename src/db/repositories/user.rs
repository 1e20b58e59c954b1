use anyhow::{Context, Result};
use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    Set,
};
use rand::Rng;
use tokio::task;

use crate::config::SecurityConfig;
use crate::domain::{AccountId, Role};
use crate::entities::users;
use crate::models::{Account, NewAccount};

impl TryFrom<users::Model> for Account {
    type Error = anyhow::Error;

    fn try_from(model: users::Model) -> Result<Self> {
        let role = model
            .status
            .parse::<Role>()
            .with_context(|| format!("Account {} has an invalid role", model.id))?;

        Ok(Self {
            id: AccountId::new(model.id),
            name: model.name,
            email: model.email,
            role,
        })
    }
}

pub struct UserRepository {
    conn: DatabaseConnection,
}

impl UserRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn count(&self) -> Result<u64> {
        users::Entity::find()
            .count(&self.conn)
            .await
            .context("Failed to count users")
    }

    /// Exact, case-sensitive match on email.
    pub async fn email_exists(&self, email: &str) -> Result<bool> {
        let count = users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .count(&self.conn)
            .await
            .context("Failed to query user by email")?;

        Ok(count > 0)
    }

    /// Get account by email together with its password hash
    pub async fn find_by_email_with_hash(&self, email: &str) -> Result<Option<(Account, String)>> {
        let user = users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .one(&self.conn)
            .await
            .context("Failed to query user by email")?;

        user.map(|u| {
            let password_hash = u.password_hash.clone();
            Account::try_from(u).map(|account| (account, password_hash))
        })
        .transpose()
    }

    /// Hashes the password and stores the account. A duplicate email surfaces
    /// as a unique-constraint `DbErr` inside the returned error.
    pub async fn insert(
        &self,
        account: NewAccount,
        security: &SecurityConfig,
    ) -> Result<Account> {
        let password_hash = hash_password_blocking(account.password, security.clone()).await?;

        let active = users::ActiveModel {
            name: Set(account.name),
            email: Set(account.email),
            password_hash: Set(password_hash),
            status: Set(account.role.as_str().to_string()),
            created_at: Set(chrono::Utc::now().to_rfc3339()),
            ..Default::default()
        };

        let model = active
            .insert(&self.conn)
            .await
            .context("Failed to insert user")?;

        Account::try_from(model)
    }
}

/// Verify a password against a stored Argon2 hash.
/// Runs on the blocking pool because Argon2 is CPU-intensive.
pub async fn verify_password(password_hash: String, password: &str) -> Result<bool> {
    let password = password.to_string();

    task::spawn_blocking(move || {
        let parsed_hash = PasswordHash::new(&password_hash)
            .map_err(|e| anyhow::anyhow!("Invalid password hash format: {e}"))?;

        Ok::<bool, anyhow::Error>(
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed_hash)
                .is_ok(),
        )
    })
    .await
    .context("Password verification task panicked")?
}

/// Hash a password using Argon2id with the configured params.
pub fn hash_password(password: &str, config: &SecurityConfig) -> Result<String> {
    let bytes: [u8; 16] = rand::rng().random();
    let salt = SaltString::encode_b64(&bytes)
        .map_err(|e| anyhow::anyhow!("Failed to encode salt: {e}"))?;

    let params = Params::new(
        config.argon2_memory_cost_kib,
        config.argon2_time_cost,
        config.argon2_parallelism,
        None,
    )
    .map_err(|e| anyhow::anyhow!("Invalid Argon2 params: {e}"))?;

    let hash = Argon2::new(Algorithm::Argon2id, Version::V0x13, params)
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {e}"))?;

    Ok(hash.to_string())
}

/// [`hash_password`] on the blocking pool.
pub async fn hash_password_blocking(password: String, config: SecurityConfig) -> Result<String> {
    task::spawn_blocking(move || hash_password(&password, &config))
        .await
        .context("Password hashing task panicked")?
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast_params() -> SecurityConfig {
        SecurityConfig {
            argon2_memory_cost_kib: 1024,
            argon2_time_cost: 1,
            argon2_parallelism: 1,
        }
    }

    #[tokio::test]
    async fn hash_then_verify() {
        let hash = hash_password("admin123", &fast_params()).unwrap();
        assert!(hash.starts_with("$argon2id$v=19$m=1024,t=1,p=1$"));
        assert!(verify_password(hash.clone(), "admin123").await.unwrap());
        assert!(!verify_password(hash, "admin124").await.unwrap());
    }

    #[tokio::test]
    async fn salts_differ_between_hashes() {
        let a = hash_password_blocking("same".into(), fast_params()).await.unwrap();
        let b = hash_password_blocking("same".into(), fast_params()).await.unwrap();
        assert_ne!(a, b);
        assert!(verify_password(a, "same").await.unwrap());
        assert!(verify_password(b, "same").await.unwrap());
    }

    #[test]
    fn bad_params_are_an_error() {
        let params = SecurityConfig {
            argon2_memory_cost_kib: 1,
            ..fast_params()
        };
        assert!(hash_password("pw", &params).is_err());
    }

    #[tokio::test]
    async fn garbage_hash_is_an_error() {
        assert!(verify_password("not-a-hash".into(), "x").await.is_err());
    }

    #[test]
    fn stored_role_must_be_known() {
        let model = users::Model {
            id: 1,
            name: "n".into(),
            email: "e".into(),
            password_hash: String::new(),
            status: "root".into(),
            created_at: String::new(),
        };
        assert!(Account::try_from(model).is_err());
    }
}

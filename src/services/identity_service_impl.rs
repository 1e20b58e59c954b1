//! `SeaORM` implementation of the `IdentityService` trait.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{DbErr, SqlErr};
use tokio::sync::OnceCell;
use tracing::{info, warn};

use crate::auth::TokenService;
use crate::config::SecurityConfig;
use crate::db::Store;
use crate::db::repositories::user::{hash_password_blocking, verify_password};
use crate::domain::Role;
use crate::models::NewAccount;
use crate::services::identity_service::{
    IdentityError, IdentityService, IssuedToken, Registration,
};

const DUMMY_PASSWORD: &str = "stockroom-dummy-password";

pub struct SeaOrmIdentityService {
    store: Store,
    tokens: Arc<TokenService>,
    security: SecurityConfig,
    /// Hash verified against when the email is unknown, so a miss costs the
    /// same Argon2 work as a wrong password.
    dummy_hash: OnceCell<String>,
}

impl SeaOrmIdentityService {
    #[must_use]
    pub const fn new(store: Store, tokens: Arc<TokenService>, security: SecurityConfig) -> Self {
        Self {
            store,
            tokens,
            security,
            dummy_hash: OnceCell::const_new(),
        }
    }

    async fn dummy_hash(&self) -> Result<String, IdentityError> {
        let hash = self
            .dummy_hash
            .get_or_try_init(|| {
                hash_password_blocking(DUMMY_PASSWORD.to_string(), self.security.clone())
            })
            .await?;
        Ok(hash.clone())
    }
}

fn is_unique_violation(err: &anyhow::Error) -> bool {
    err.downcast_ref::<DbErr>()
        .and_then(DbErr::sql_err)
        .is_some_and(|e| matches!(e, SqlErr::UniqueConstraintViolation(_)))
}

#[async_trait]
impl IdentityService for SeaOrmIdentityService {
    async fn register(&self, registration: Registration) -> Result<IssuedToken, IdentityError> {
        info!(email = %registration.email, "Registration attempt");

        // Best-effort pre-check; the unique index is the real authority.
        if self.store.email_exists(&registration.email).await? {
            info!(email = %registration.email, "Registration rejected: email already exists");
            return Err(IdentityError::EmailTaken);
        }

        let account = NewAccount {
            name: registration.name,
            email: registration.email,
            password: registration.password,
            role: Role::Standard,
        };

        let account = match self.store.create_account(account, &self.security).await {
            Ok(account) => account,
            Err(e) if is_unique_violation(&e) => {
                warn!("Registration lost a race on a duplicate email");
                return Err(IdentityError::EmailTaken);
            }
            Err(e) => return Err(e.into()),
        };

        info!(user_id = %account.id, email = %account.email, "Account created");

        let token = self.tokens.issue(&account, Utc::now())?;
        Ok(IssuedToken { token, account })
    }

    async fn login(&self, email: &str, password: &str) -> Result<IssuedToken, IdentityError> {
        let Some((account, password_hash)) = self.store.find_account_with_hash(email).await?
        else {
            verify_password(self.dummy_hash().await?, password).await?;
            info!("Login failed");
            return Err(IdentityError::InvalidCredentials);
        };

        if !verify_password(password_hash, password).await? {
            info!("Login failed");
            return Err(IdentityError::InvalidCredentials);
        }

        info!(user_id = %account.id, role = %account.role, "Login succeeded");

        let token = self.tokens.issue(&account, Utc::now())?;
        Ok(IssuedToken { token, account })
    }
}

//! Domain service for account registration and login.
//!
//! Both operations end by issuing a token for the resulting account.

use serde::Serialize;
use thiserror::Error;

use crate::auth::{AuthContext, TokenError};
use crate::domain::{AccountId, Role};
use crate::models::Account;

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("User with this email already exists")]
    EmailTaken,

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Token error: {0}")]
    Token(#[from] TokenError),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for IdentityError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for IdentityError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(format!("{err:#}"))
    }
}

#[derive(Debug, Clone)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// A freshly signed token together with the account it was issued for.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub account: Account,
}

/// Identity as seen through verified claims.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Profile {
    pub user_id: AccountId,
    pub name: String,
    pub email: String,
    pub status: Role,
}

#[async_trait::async_trait]
pub trait IdentityService: Send + Sync {
    /// Creates a standard account and signs a token for it.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityError::EmailTaken`] if the email is already registered.
    async fn register(&self, registration: Registration) -> Result<IssuedToken, IdentityError>;

    /// Returns [`IdentityError::InvalidCredentials`] for an unknown email and
    /// for a wrong password alike.
    async fn login(&self, email: &str, password: &str) -> Result<IssuedToken, IdentityError>;

    /// Projects already-verified claims. No store access.
    fn profile(&self, context: &AuthContext) -> Profile {
        let claims = &context.claims;
        Profile {
            user_id: claims.user_id,
            name: claims.name.clone(),
            email: claims.email.clone(),
            status: claims.status,
        }
    }
}

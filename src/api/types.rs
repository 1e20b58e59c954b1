use serde::{Deserialize, Serialize};

use crate::domain::Role;
use crate::models::NewItem;
use crate::services::IssuedToken;

/// Body of every error response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}

/// Request bodies zero-fill absent fields; only undecodable input is rejected.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    /// Accepted and ignored: self-registration always yields a standard account.
    pub status: Option<String>,
}

/// Returned by login and registration.
#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub message: String,
    pub name: String,
    pub email: String,
    pub status: Role,
}

impl AuthResponse {
    #[must_use]
    pub fn new(issued: IssuedToken, message: &str) -> Self {
        Self {
            token: issued.token,
            message: message.to_string(),
            name: issued.account.name,
            email: issued.account.email,
            status: issued.account.role,
        }
    }
}

/// Product fields as submitted for create and replace. Any `id` in the body
/// is ignored.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ProductRequest {
    pub name: String,
    pub category: String,
    pub price: f64,
    pub quantity: i64,
}

impl From<ProductRequest> for NewItem {
    fn from(req: ProductRequest) -> Self {
        Self {
            name: req.name,
            category: req.category,
            price: req.price,
            quantity: req.quantity,
        }
    }
}

use serde::{Deserialize, Serialize};

use crate::domain::{AccountId, Role};
use crate::models::Account;

/// Payload of an issued token.
///
/// Field names are part of the wire format: clients decode `status` to learn
/// their role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: AccountId,
    pub name: String,
    pub email: String,
    pub status: Role,
    /// Issued-at, unix seconds.
    pub iat: i64,
    /// Expiry, unix seconds.
    pub exp: i64,
}

impl Claims {
    #[must_use]
    pub fn for_account(account: &Account, issued_at: i64, expires_at: i64) -> Self {
        Self {
            user_id: account.id,
            name: account.name.clone(),
            email: account.email.clone(),
            status: account.role,
            iat: issued_at,
            exp: expires_at,
        }
    }
}

use serde::Serialize;

use crate::domain::{AccountId, Role};

/// An account as read back from the store, without its password hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Account {
    pub id: AccountId,
    pub name: String,
    pub email: String,
    pub role: Role,
}

/// Input for account creation. The role is decided by the caller of the
/// repository, never by the registrant.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
}

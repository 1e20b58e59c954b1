pub mod account;
pub mod item;

pub use account::{Account, NewAccount};
pub use item::{CatalogItem, NewItem};

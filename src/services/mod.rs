pub mod catalog_service;
pub use catalog_service::{CatalogError, CatalogService, UpdateOutcome};

pub mod catalog_service_impl;
pub use catalog_service_impl::SeaOrmCatalogService;

pub mod identity_service;
pub use identity_service::{IdentityError, IdentityService, IssuedToken, Profile, Registration};

pub mod identity_service_impl;
pub use identity_service_impl::SeaOrmIdentityService;

//! Infrastructure for GreenNest: concrete collaborators behind the core traits.

pub mod config_service;
pub mod memory_identity_provider;
pub mod paths;
pub mod product_source;

pub use crate::config_service::ConfigService;
pub use crate::memory_identity_provider::{FederatedIdentity, InMemoryIdentityProvider};
pub use crate::paths::GreenNestPaths;
pub use crate::product_source::{FileProductSource, HttpProductSource, product_source_from_config};

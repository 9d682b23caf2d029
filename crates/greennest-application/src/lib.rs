//! Application layer for GreenNest.
//!
//! This crate provides the use cases behind the pages, coordinating the
//! session manager and the catalog query engine from `greennest-core`.

pub mod auth_usecase;
pub mod catalog_usecase;

pub use auth_usecase::{AuthUseCase, SignUpForm};
pub use catalog_usecase::CatalogUseCase;

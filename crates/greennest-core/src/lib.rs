//! Domain core of the GreenNest plant shop client.
//!
//! - [`session`]: authentication session state machine over an identity provider
//! - [`catalog`]: product model and the Catalog Query Engine
//! - [`routing`]: route table and authentication guard
//! - [`config`]: application configuration model

pub mod catalog;
pub mod config;
pub mod error;
pub mod routing;
pub mod session;

// Re-export common error type
pub use error::GreenNestError;

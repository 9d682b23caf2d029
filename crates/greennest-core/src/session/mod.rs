//! Session domain module.
//!
//! This module contains the client-side authentication session: the user and
//! session models, the identity provider contract, the password policy and
//! the session manager that bridges imperative auth requests to a reactive
//! session snapshot.
//!
//! # Module Structure
//!
//! - `model`: `AuthUser`, `Session`, `AuthState`, `ProfileUpdate`
//! - `provider`: `IdentityProvider` trait and `Subscription` handle
//! - `password`: `PasswordPolicy` checked before sign-up
//! - `manager`: `SessionManager`
//!
//! # Usage
//!
//! ```ignore
//! use greennest_core::session::{SessionManager, IdentityProvider, Session};
//! ```

mod manager;
mod model;
mod password;
mod provider;


// Re-export public API
pub use manager::SessionManager;
pub use model::{AuthState, AuthUser, ProfileUpdate, Session};
pub use password::{MIN_PASSWORD_LENGTH, PasswordCheck, PasswordPolicy};
pub use provider::{AuthStateListener, IdentityProvider, Subscription};

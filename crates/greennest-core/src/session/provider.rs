//! Identity provider contract.
//!
//! The session manager depends only on this narrow surface, never on a
//! concrete provider SDK.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use super::model::{AuthUser, ProfileUpdate};
use crate::error::Result;

/// Callback invoked by the provider whenever the signed-in user changes.
///
/// `None` means nobody is signed in.
pub type AuthStateListener = Arc<dyn Fn(Option<AuthUser>) + Send + Sync>;

/// Handle to a registered [`AuthStateListener`].
///
/// Dropping the handle unsubscribes the listener.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    unsubscribe: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    pub fn new(unsubscribe: impl FnOnce() + Send + 'static) -> Self {
        Self {
            unsubscribe: Some(Box::new(unsubscribe)),
        }
    }

    /// A handle with nothing to release.
    pub fn detached() -> Self {
        Self { unsubscribe: None }
    }

    /// Unsubscribes now instead of at drop.
    pub fn unsubscribe(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if let Some(unsubscribe) = self.unsubscribe.take() {
            unsubscribe();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.unsubscribe.is_some())
            .finish()
    }
}

/// External service performing credential verification and issuing users.
///
/// Mutating calls only *request* a change. The provider announces the
/// resulting user through the listeners registered with
/// [`IdentityProvider::on_auth_state_changed`], including after profile
/// updates.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Creates a new email/password identity and signs it in.
    ///
    /// # Errors
    ///
    /// `DuplicateAccount`, `WeakPassword` or `InvalidEmail`.
    async fn create_user(&self, email: &str, password: &str) -> Result<AuthUser>;

    /// Signs in with email and password.
    ///
    /// # Errors
    ///
    /// `UserNotFound`, `WrongCredentials`, `InvalidEmail` or `TooManyAttempts`.
    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<AuthUser>;

    /// Runs the interactive federated consent flow.
    ///
    /// # Errors
    ///
    /// `FederatedSignInFailed` for every failure mode.
    async fn sign_in_with_federated(&self) -> Result<AuthUser>;

    /// Discards the local credentials. Never fails.
    async fn sign_out(&self);

    /// Sends a password reset email.
    ///
    /// # Errors
    ///
    /// `InvalidEmail`, or `UserNotFound` when the provider discloses it.
    async fn send_password_reset(&self, email: &str) -> Result<()>;

    /// Replaces the display name and photo of the signed-in user.
    ///
    /// # Errors
    ///
    /// `NotAuthenticated` when nobody is signed in.
    async fn update_profile(&self, update: ProfileUpdate) -> Result<()>;

    /// The user the provider currently considers signed in.
    fn current_user(&self) -> Option<AuthUser>;

    /// Registers a listener for user changes.
    ///
    /// Providers deliver an initial notification with the current user some
    /// time after registration.
    fn on_auth_state_changed(&self, listener: AuthStateListener) -> Subscription;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_subscription_releases_once_on_drop() {
        let released = Arc::new(AtomicUsize::new(0));
        let counter = released.clone();
        let subscription = Subscription::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        drop(subscription);
        assert_eq!(released.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_explicit_unsubscribe_does_not_release_twice() {
        let released = Arc::new(AtomicUsize::new(0));
        let counter = released.clone();
        let subscription = Subscription::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        subscription.unsubscribe();
        assert_eq!(released.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_detached_subscription_is_inert() {
        let subscription = Subscription::detached();
        assert_eq!(format!("{subscription:?}"), "Subscription { active: false }");
    }
}

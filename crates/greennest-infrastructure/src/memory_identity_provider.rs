//! In-process identity provider.
//!
//! Keeps accounts in memory and follows the same rules a hosted provider
//! applies: email syntax, a minimum password length, throttling after
//! repeated wrong passwords and change notifications on every sign-in,
//! sign-out and profile edit.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::Utc;
use greennest_core::error::{GreenNestError, Result};
use greennest_core::session::{
    AuthStateListener, AuthUser, IdentityProvider, ProfileUpdate, Subscription,
};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Wrong passwords allowed per account before sign-in is throttled.
pub const MAX_FAILED_ATTEMPTS: u32 = 5;

/// Shortest password the provider accepts.
pub const PROVIDER_MIN_PASSWORD_LENGTH: usize = 6;

static EMAIL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid")
});

/// Identity returned by the federated consent flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FederatedIdentity {
    pub email: String,
    pub display_name: Option<String>,
    pub photo_url: Option<String>,
}

#[derive(Debug, Clone)]
struct Account {
    /// `None` for accounts created through federated sign-in
    password: Option<String>,
    user: AuthUser,
    failed_attempts: u32,
}

#[derive(Debug, Default)]
struct ProviderState {
    /// Keyed by normalized email
    accounts: HashMap<String, Account>,
    /// Normalized email of the signed-in account
    current: Option<String>,
    federated: Option<FederatedIdentity>,
    sent_resets: Vec<String>,
}

impl ProviderState {
    fn current_user(&self) -> Option<AuthUser> {
        self.current
            .as_ref()
            .and_then(|key| self.accounts.get(key))
            .map(|account| account.user.clone())
    }
}

/// [`IdentityProvider`] backed by process memory.
#[derive(Default)]
pub struct InMemoryIdentityProvider {
    state: Mutex<ProviderState>,
    listeners: Arc<Mutex<HashMap<u64, AuthStateListener>>>,
    next_listener_id: AtomicU64,
}

impl InMemoryIdentityProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an email/password account without signing it in.
    ///
    /// # Errors
    ///
    /// Same as account creation: `InvalidEmail`, `WeakPassword`,
    /// `DuplicateAccount`.
    pub fn seed_account(
        &self,
        email: &str,
        password: &str,
        display_name: Option<&str>,
    ) -> Result<AuthUser> {
        let mut state = self.lock_state();
        let mut user = Self::insert_account(&mut state, email, Some(password))?;
        if let Some(name) = display_name {
            user.display_name = Some(name.to_string());
            if let Some(account) = state.accounts.get_mut(&normalize(email)) {
                account.user.display_name = Some(name.to_string());
            }
        }
        Ok(user)
    }

    /// Sets the identity the next federated consent flow returns.
    /// `None` makes the flow fail, as when the user closes the popup.
    pub fn set_federated_identity(&self, identity: Option<FederatedIdentity>) {
        self.lock_state().federated = identity;
    }

    /// Ends the current session from the provider side, e.g. revoked token.
    pub fn invalidate_session(&self) {
        let ended = self.lock_state().current.take();
        if let Some(email) = ended {
            info!(email = %email, "Provider invalidated session");
            self.notify(None);
        }
    }

    /// Addresses password reset emails were sent to, oldest first.
    pub fn sent_password_resets(&self) -> Vec<String> {
        self.lock_state().sent_resets.clone()
    }

    pub fn listener_count(&self) -> usize {
        self.lock_listeners().len()
    }

    fn lock_state(&self) -> MutexGuard<'_, ProviderState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_listeners(&self) -> MutexGuard<'_, HashMap<u64, AuthStateListener>> {
        self.listeners.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn notify(&self, user: Option<AuthUser>) {
        // Listeners run outside the lock so they may call back into the provider
        let listeners: Vec<AuthStateListener> = self.lock_listeners().values().cloned().collect();
        debug!(listeners = listeners.len(), signed_in = user.is_some(), "Notifying auth state");
        for listener in listeners {
            listener(user.clone());
        }
    }

    fn insert_account(
        state: &mut ProviderState,
        email: &str,
        password: Option<&str>,
    ) -> Result<AuthUser> {
        validate_email(email)?;
        if let Some(password) = password {
            if password.chars().count() < PROVIDER_MIN_PASSWORD_LENGTH {
                return Err(GreenNestError::WeakPassword);
            }
        }
        let key = normalize(email);
        if state.accounts.contains_key(&key) {
            return Err(GreenNestError::DuplicateAccount);
        }

        let user = AuthUser {
            id: Uuid::new_v4().to_string(),
            email: email.trim().to_string(),
            display_name: None,
            photo_url: None,
            created_at: Utc::now(),
        };
        state.accounts.insert(
            key,
            Account {
                password: password.map(str::to_string),
                user: user.clone(),
                failed_attempts: 0,
            },
        );
        Ok(user)
    }
}

fn normalize(email: &str) -> String {
    email.trim().to_lowercase()
}

fn validate_email(email: &str) -> Result<()> {
    if EMAIL_PATTERN.is_match(email.trim()) {
        Ok(())
    } else {
        Err(GreenNestError::InvalidEmail)
    }
}

#[async_trait]
impl IdentityProvider for InMemoryIdentityProvider {
    async fn create_user(&self, email: &str, password: &str) -> Result<AuthUser> {
        let user = {
            let mut state = self.lock_state();
            let user = Self::insert_account(&mut state, email, Some(password))?;
            state.current = Some(normalize(email));
            user
        };
        info!(user_id = %user.id, "Account created");
        self.notify(Some(user.clone()));
        Ok(user)
    }

    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<AuthUser> {
        validate_email(email)?;
        let key = normalize(email);
        let user = {
            let mut state = self.lock_state();
            let account = state
                .accounts
                .get_mut(&key)
                .ok_or(GreenNestError::UserNotFound)?;

            if account.failed_attempts >= MAX_FAILED_ATTEMPTS {
                warn!(email, "Sign-in throttled");
                return Err(GreenNestError::TooManyAttempts);
            }
            if account.password.as_deref() != Some(password) {
                account.failed_attempts += 1;
                return Err(GreenNestError::WrongCredentials);
            }

            account.failed_attempts = 0;
            let user = account.user.clone();
            state.current = Some(key);
            user
        };
        self.notify(Some(user.clone()));
        Ok(user)
    }

    async fn sign_in_with_federated(&self) -> Result<AuthUser> {
        let user = {
            let mut state = self.lock_state();
            let identity = state
                .federated
                .clone()
                .ok_or(GreenNestError::FederatedSignInFailed)?;
            let key = normalize(&identity.email);

            if !state.accounts.contains_key(&key) {
                Self::insert_account(&mut state, &identity.email, None)
                    .map_err(|_| GreenNestError::FederatedSignInFailed)?;
                if let Some(account) = state.accounts.get_mut(&key) {
                    account.user.display_name = identity.display_name.clone();
                    account.user.photo_url = identity.photo_url.clone();
                }
            }
            state.current = Some(key);
            state
                .current_user()
                .ok_or_else(|| GreenNestError::internal("federated account missing"))?
        };
        self.notify(Some(user.clone()));
        Ok(user)
    }

    async fn sign_out(&self) {
        self.lock_state().current = None;
        self.notify(None);
    }

    async fn send_password_reset(&self, email: &str) -> Result<()> {
        validate_email(email)?;
        let mut state = self.lock_state();
        if !state.accounts.contains_key(&normalize(email)) {
            return Err(GreenNestError::UserNotFound);
        }
        state.sent_resets.push(email.trim().to_string());
        Ok(())
    }

    async fn update_profile(&self, update: ProfileUpdate) -> Result<()> {
        let user = {
            let mut state = self.lock_state();
            let key = state.current.clone().ok_or(GreenNestError::NotAuthenticated)?;
            let account = state
                .accounts
                .get_mut(&key)
                .ok_or(GreenNestError::NotAuthenticated)?;
            account.user.display_name = update.display_name;
            account.user.photo_url = update.photo_url;
            account.user.clone()
        };
        self.notify(Some(user));
        Ok(())
    }

    fn current_user(&self) -> Option<AuthUser> {
        self.lock_state().current_user()
    }

    fn on_auth_state_changed(&self, listener: AuthStateListener) -> Subscription {
        let id = self.next_listener_id.fetch_add(1, Ordering::SeqCst);
        self.lock_listeners().insert(id, listener.clone());

        // Initial notification with the current user
        listener(self.current_user());

        let listeners = Arc::downgrade(&self.listeners);
        Subscription::new(move || {
            if let Some(listeners) = listeners.upgrade() {
                listeners
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .remove(&id);
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use greennest_core::session::{AuthState, SessionManager};

    fn provider_with_ivy() -> Arc<InMemoryIdentityProvider> {
        let provider = Arc::new(InMemoryIdentityProvider::new());
        provider
            .seed_account("ivy@greennest.test", "Secret1", Some("Ivy"))
            .unwrap();
        provider
    }

    #[tokio::test]
    async fn test_create_user_validations() {
        let provider = provider_with_ivy();

        assert_eq!(
            provider.create_user("not-an-email", "Secret1").await,
            Err(GreenNestError::InvalidEmail)
        );
        assert_eq!(
            provider.create_user("new@greennest.test", "abc").await,
            Err(GreenNestError::WeakPassword)
        );
        assert_eq!(
            provider.create_user("IVY@greennest.test", "Secret1").await,
            Err(GreenNestError::DuplicateAccount)
        );

        let user = provider.create_user("new@greennest.test", "Secret1").await.unwrap();
        assert_eq!(provider.current_user(), Some(user));
    }

    #[tokio::test]
    async fn test_sign_in_errors() {
        let provider = provider_with_ivy();

        assert_eq!(
            provider.sign_in_with_password("ghost@greennest.test", "x").await,
            Err(GreenNestError::UserNotFound)
        );
        assert_eq!(
            provider.sign_in_with_password("ivy@greennest.test", "wrong").await,
            Err(GreenNestError::WrongCredentials)
        );
        assert_eq!(
            provider.sign_in_with_password("ivy", "Secret1").await,
            Err(GreenNestError::InvalidEmail)
        );

        let user = provider
            .sign_in_with_password("ivy@greennest.test", "Secret1")
            .await
            .unwrap();
        assert_eq!(user.display_name.as_deref(), Some("Ivy"));
    }

    #[tokio::test]
    async fn test_throttles_after_repeated_failures() {
        let provider = provider_with_ivy();

        for _ in 0..MAX_FAILED_ATTEMPTS {
            assert_eq!(
                provider.sign_in_with_password("ivy@greennest.test", "wrong").await,
                Err(GreenNestError::WrongCredentials)
            );
        }
        assert_eq!(
            provider.sign_in_with_password("ivy@greennest.test", "Secret1").await,
            Err(GreenNestError::TooManyAttempts)
        );
    }

    #[tokio::test]
    async fn test_federated_flow() {
        let provider = Arc::new(InMemoryIdentityProvider::new());
        assert_eq!(
            provider.sign_in_with_federated().await,
            Err(GreenNestError::FederatedSignInFailed)
        );

        provider.set_federated_identity(Some(FederatedIdentity {
            email: "leaf@gmail.test".to_string(),
            display_name: Some("Leaf".to_string()),
            photo_url: None,
        }));
        let first = provider.sign_in_with_federated().await.unwrap();
        let again = provider.sign_in_with_federated().await.unwrap();

        assert_eq!(first.id, again.id);
        assert_eq!(first.display_name.as_deref(), Some("Leaf"));
        // Federated accounts have no password
        assert_eq!(
            provider.sign_in_with_password("leaf@gmail.test", "").await,
            Err(GreenNestError::WrongCredentials)
        );
    }

    #[tokio::test]
    async fn test_password_reset_records_known_accounts() {
        let provider = provider_with_ivy();

        provider.send_password_reset("ivy@greennest.test").await.unwrap();
        assert_eq!(
            provider.send_password_reset("ghost@greennest.test").await,
            Err(GreenNestError::UserNotFound)
        );
        assert_eq!(provider.sent_password_resets(), vec!["ivy@greennest.test"]);
    }

    #[tokio::test]
    async fn test_session_manager_follows_provider() {
        let provider = provider_with_ivy();
        let manager = SessionManager::new(provider.clone());
        assert_eq!(manager.auth_state(), AuthState::SignedOut);
        assert_eq!(provider.listener_count(), 1);

        manager.sign_in("ivy@greennest.test", "Secret1").await.unwrap();
        assert!(manager.auth_state().is_signed_in());

        manager
            .update_profile(ProfileUpdate::from_form("Ivy Green", "https://img.test/ivy.png"))
            .await
            .unwrap();
        let user = manager.current_user().unwrap();
        assert_eq!(user.display_name.as_deref(), Some("Ivy Green"));
        assert_eq!(user.photo_url.as_deref(), Some("https://img.test/ivy.png"));

        provider.invalidate_session();
        assert_eq!(manager.auth_state(), AuthState::SignedOut);

        drop(manager);
        assert_eq!(provider.listener_count(), 0);
    }
}

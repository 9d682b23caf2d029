//! Session Manager: the single owner of the signed-in user.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError, Weak};

use tokio::sync::watch;
use tracing::{debug, info, warn};

use super::model::{AuthState, AuthUser, ProfileUpdate, Session};
use super::provider::{AuthStateListener, IdentityProvider, Subscription};
use crate::error::{GreenNestError, Result};

/// Single source of truth for who is signed in.
///
/// `SessionManager` is responsible for:
/// - Holding exactly one subscription to the identity provider
/// - Publishing [`Session`] snapshots to any number of read-only consumers
/// - Forwarding register/sign-in/sign-out/profile requests to the provider
///
/// Operations never write `current_user` themselves. The session only takes
/// the user the provider reports through its change notification, so a
/// failed or still-pending request cannot leave local state ahead of the
/// provider.
///
/// Mutating operations are serialized: a second sign-in submitted while the
/// first is in flight waits for it instead of interleaving.
pub struct SessionManager {
    provider: Arc<dyn IdentityProvider>,
    cell: Arc<SessionCell>,
    subscription: Mutex<Option<Subscription>>,
    operation_gate: tokio::sync::Mutex<()>,
}

impl SessionManager {
    /// Creates a manager and subscribes to `provider`.
    ///
    /// The session reports `is_loading` until the provider delivers its first
    /// notification. There is no timeout.
    pub fn new(provider: Arc<dyn IdentityProvider>) -> Self {
        let cell = Arc::new(SessionCell::new());
        let listener = SessionCell::listener(Arc::downgrade(&cell));
        let subscription = provider.on_auth_state_changed(listener);
        debug!("Subscribed to identity provider notifications");

        Self {
            provider,
            cell,
            subscription: Mutex::new(Some(subscription)),
            operation_gate: tokio::sync::Mutex::new(()),
        }
    }

    /// Current session snapshot.
    pub fn session(&self) -> Session {
        self.cell.snapshot()
    }

    /// Current state of the session state machine.
    pub fn auth_state(&self) -> AuthState {
        self.cell.auth_state()
    }

    pub fn current_user(&self) -> Option<AuthUser> {
        self.session().current_user
    }

    pub fn is_loading(&self) -> bool {
        self.session().is_loading
    }

    /// Returns a receiver that observes every session change.
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.cell.sender.subscribe()
    }

    /// Creates an email/password account.
    ///
    /// Display name and photo are not set here; follow up with
    /// [`SessionManager::update_profile`].
    ///
    /// # Errors
    ///
    /// `DuplicateAccount`, `WeakPassword` or `InvalidEmail` from the provider.
    pub async fn register(&self, email: &str, password: &str) -> Result<Session> {
        let busy = self.cell.begin_operation();
        let _gate = self.operation_gate.lock().await;
        debug!(email, "Registering account");

        let user = self
            .provider
            .create_user(email, password)
            .await
            .inspect_err(|e| warn!(email, error = %e, "Registration rejected"))?;
        info!(user_id = %user.id, "Account created");

        drop(busy);
        Ok(self.session())
    }

    /// Signs in with email and password.
    ///
    /// # Errors
    ///
    /// `UserNotFound`, `WrongCredentials`, `InvalidEmail` or `TooManyAttempts`.
    /// The session is left exactly as it was before the call.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Session> {
        let busy = self.cell.begin_operation();
        let _gate = self.operation_gate.lock().await;
        debug!(email, "Signing in");

        let user = self
            .provider
            .sign_in_with_password(email, password)
            .await
            .inspect_err(|e| warn!(email, error = %e, "Sign-in rejected"))?;
        info!(user_id = %user.id, "Sign-in accepted");

        drop(busy);
        Ok(self.session())
    }

    /// Signs in through the federated consent flow.
    ///
    /// # Errors
    ///
    /// Always `FederatedSignInFailed`, whatever went wrong in the flow.
    pub async fn federated_sign_in(&self) -> Result<Session> {
        let busy = self.cell.begin_operation();
        let _gate = self.operation_gate.lock().await;
        debug!("Starting federated sign-in");

        let user = self.provider.sign_in_with_federated().await.map_err(|e| {
            warn!(error = %e, "Federated sign-in failed");
            GreenNestError::FederatedSignInFailed
        })?;
        info!(user_id = %user.id, "Federated sign-in accepted");

        drop(busy);
        Ok(self.session())
    }

    /// Signs out. The user is cleared when the provider confirms it.
    pub async fn sign_out(&self) {
        let _busy = self.cell.begin_operation();
        let _gate = self.operation_gate.lock().await;
        self.provider.sign_out().await;
        info!("Signed out");
    }

    /// Asks the provider to send a password reset email.
    ///
    /// Whether an account exists for `email` is not disclosed: an unknown
    /// address reports success like a known one. The session's loading flag
    /// is not touched.
    ///
    /// # Errors
    ///
    /// `InvalidEmail`, or whatever else the provider reports.
    pub async fn request_password_reset(&self, email: &str) -> Result<()> {
        match self.provider.send_password_reset(email).await {
            Ok(()) => {
                info!("Password reset requested");
                Ok(())
            }
            Err(GreenNestError::UserNotFound) => {
                debug!("Password reset for unknown account reported as sent");
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "Password reset failed");
                Err(e)
            }
        }
    }

    /// Replaces the signed-in user's display name and photo.
    ///
    /// # Errors
    ///
    /// `NotAuthenticated` when the provider has nobody signed in. The
    /// provider is asked rather than the session, so the update right after
    /// [`SessionManager::register`] works before the new user is announced.
    pub async fn update_profile(&self, update: ProfileUpdate) -> Result<()> {
        let _busy = self.cell.begin_operation();
        let _gate = self.operation_gate.lock().await;
        if self.provider.current_user().is_none() {
            return Err(GreenNestError::NotAuthenticated);
        }
        debug!(?update, "Updating profile");

        self.provider
            .update_profile(update)
            .await
            .inspect_err(|e| warn!(error = %e, "Profile update rejected"))?;
        info!("Profile updated");
        Ok(())
    }

    /// Drops the provider subscription. Later notifications are ignored.
    pub fn shutdown(&self) {
        self.cell.active.store(false, Ordering::SeqCst);
        let subscription = self
            .subscription
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(subscription) = subscription {
            subscription.unsubscribe();
            debug!("Unsubscribed from identity provider notifications");
        }
    }
}

impl Drop for SessionManager {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Mutable session state behind the published snapshot.
#[derive(Debug, Default)]
struct SessionInner {
    current_user: Option<AuthUser>,
    /// Set once the provider has delivered its first notification
    initialized: bool,
    in_flight: usize,
}

impl SessionInner {
    fn snapshot(&self) -> Session {
        Session {
            current_user: self.current_user.clone(),
            is_loading: !self.initialized || self.in_flight > 0,
        }
    }
}

struct SessionCell {
    inner: Mutex<SessionInner>,
    sender: watch::Sender<Session>,
    /// Cleared on shutdown; notifications arriving later are discarded
    active: AtomicBool,
}

impl SessionCell {
    fn new() -> Self {
        let (sender, _) = watch::channel(Session::initializing());
        Self {
            inner: Mutex::new(SessionInner::default()),
            sender,
            active: AtomicBool::new(true),
        }
    }

    fn listener(cell: Weak<SessionCell>) -> AuthStateListener {
        Arc::new(move |user: Option<AuthUser>| {
            let Some(cell) = cell.upgrade() else {
                return;
            };
            if !cell.active.load(Ordering::SeqCst) {
                debug!("Ignoring provider notification after shutdown");
                return;
            }
            cell.apply_provider_user(user);
        })
    }

    fn snapshot(&self) -> Session {
        self.sender.borrow().clone()
    }

    fn auth_state(&self) -> AuthState {
        let inner = self.lock();
        match (&inner.current_user, inner.initialized) {
            (_, false) => AuthState::Initializing,
            (None, true) => AuthState::SignedOut,
            (Some(user), true) => AuthState::SignedIn(user.clone()),
        }
    }

    fn apply_provider_user(&self, user: Option<AuthUser>) {
        self.update(|inner| {
            match (&inner.current_user, &user) {
                (None, Some(next)) => info!(user_id = %next.id, "Session signed in"),
                (Some(prev), None) => info!(user_id = %prev.id, "Session signed out"),
                _ => debug!("Session user refreshed"),
            }
            inner.current_user = user;
            inner.initialized = true;
        });
    }

    fn begin_operation(&self) -> InFlight<'_> {
        self.update(|inner| inner.in_flight += 1);
        InFlight { cell: self }
    }

    fn update(&self, mutate: impl FnOnce(&mut SessionInner)) {
        let mut inner = self.lock();
        mutate(&mut inner);
        let next = inner.snapshot();
        // Publish while holding the lock so snapshots are never reordered.
        self.sender.send_if_modified(|current| {
            if *current == next {
                false
            } else {
                *current = next;
                true
            }
        });
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, SessionInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Marks one operation as in flight until dropped, including when the
/// operation's future is dropped mid-way.
struct InFlight<'a> {
    cell: &'a SessionCell,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.cell
            .update(|inner| inner.in_flight = inner.in_flight.saturating_sub(1));
    }
}

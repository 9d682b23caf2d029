//! Account flows behind the login, register and profile pages.

use std::sync::Arc;

use greennest_core::error::{GreenNestError, Result};
use greennest_core::routing::{self, HOME_PATH, Navigation};
use greennest_core::session::{PasswordPolicy, ProfileUpdate, SessionManager};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Input of the registration form.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SignUpForm {
    pub name: String,
    pub email: String,
    /// Optional; blank means no photo
    #[serde(default)]
    pub photo_url: String,
    pub password: String,
}

/// Coordinates the session manager for the account pages.
pub struct AuthUseCase {
    sessions: Arc<SessionManager>,
    password_policy: PasswordPolicy,
}

impl AuthUseCase {
    pub fn new(sessions: Arc<SessionManager>) -> Self {
        Self {
            sessions,
            password_policy: PasswordPolicy::default(),
        }
    }

    pub fn with_password_policy(mut self, policy: PasswordPolicy) -> Self {
        self.password_policy = policy;
        self
    }

    pub fn sessions(&self) -> &Arc<SessionManager> {
        &self.sessions
    }

    /// Creates an account, then sets its display name and photo.
    ///
    /// A password failing the password policy is rejected before the
    /// identity provider is contacted. Returns the path to navigate to.
    ///
    /// # Errors
    ///
    /// `WeakPassword` from the policy; otherwise whatever registration or the
    /// profile update report. When the profile update fails the account
    /// already exists.
    pub async fn sign_up(&self, form: &SignUpForm) -> Result<String> {
        let check = self.password_policy.check(&form.password);
        if !check.is_valid() {
            debug!(unmet = ?check.unmet(), "Password rejected by policy");
            return Err(GreenNestError::WeakPassword);
        }

        self.sessions.register(&form.email, &form.password).await?;
        self.sessions
            .update_profile(ProfileUpdate::from_form(&form.name, &form.photo_url))
            .await?;
        info!("Sign-up completed");
        Ok(HOME_PATH.to_string())
    }

    /// Signs in and returns where to navigate: the page the user was sent
    /// away from, else home.
    pub async fn login(&self, email: &str, password: &str, from: Option<&str>) -> Result<String> {
        self.sessions.sign_in(email, password).await?;
        Ok(routing::post_login_destination(from))
    }

    /// Federated variant of [`AuthUseCase::login`].
    pub async fn login_with_federated(&self, from: Option<&str>) -> Result<String> {
        self.sessions.federated_sign_in().await?;
        Ok(routing::post_login_destination(from))
    }

    /// Sends a password reset email.
    ///
    /// # Errors
    ///
    /// `InvalidEmail` when the email field is empty (the provider is not
    /// called) or malformed.
    pub async fn reset_password(&self, email: &str) -> Result<()> {
        if email.trim().is_empty() {
            return Err(GreenNestError::InvalidEmail);
        }
        self.sessions.request_password_reset(email.trim()).await
    }

    /// Saves the profile form.
    pub async fn update_profile(&self, display_name: &str, photo_url: &str) -> Result<()> {
        self.sessions
            .update_profile(ProfileUpdate::from_form(display_name, photo_url))
            .await
    }

    pub async fn logout(&self) {
        self.sessions.sign_out().await;
    }

    /// Route guard decision for `path` with the current session.
    pub fn navigate(&self, path: &str) -> Navigation {
        routing::guard(path, &self.sessions.session())
    }
}

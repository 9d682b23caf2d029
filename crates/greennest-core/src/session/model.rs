//! Session domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A user record as issued by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthUser {
    /// Provider-assigned user id
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default, rename = "photoURL")]
    pub photo_url: Option<String>,
    /// When the account was created (shown as the join date on the profile page)
    pub created_at: DateTime<Utc>,
}

impl AuthUser {
    /// Name to greet the user with: display name, else the email.
    pub fn greeting_name(&self) -> &str {
        self.display_name
            .as_deref()
            .filter(|name| !name.is_empty())
            .unwrap_or(&self.email)
    }
}

/// Replacement values for the two editable profile fields.
///
/// Both fields are replaced as given; `None` clears the field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileUpdate {
    pub display_name: Option<String>,
    pub photo_url: Option<String>,
}

impl ProfileUpdate {
    /// Builds an update from raw form input, treating blank fields as absent.
    pub fn from_form(display_name: &str, photo_url: &str) -> Self {
        fn non_blank(value: &str) -> Option<String> {
            let trimmed = value.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }

        Self {
            display_name: non_blank(display_name),
            photo_url: non_blank(photo_url),
        }
    }
}

/// Snapshot of the authentication session shared with every consumer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// The signed-in user, as last reported by the identity provider
    pub current_user: Option<AuthUser>,
    /// True until the provider's first notification, and while an operation runs
    pub is_loading: bool,
}

impl Session {
    /// The state before the identity provider has reported anything.
    pub fn initializing() -> Self {
        Self {
            current_user: None,
            is_loading: true,
        }
    }

    pub fn is_signed_in(&self) -> bool {
        self.current_user.is_some()
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::initializing()
    }
}

/// The session state machine as seen from outside.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthState {
    /// No provider notification has arrived yet
    Initializing,
    SignedOut,
    SignedIn(AuthUser),
}

impl AuthState {
    pub fn is_signed_in(&self) -> bool {
        matches!(self, Self::SignedIn(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(display_name: Option<&str>) -> AuthUser {
        AuthUser {
            id: "uid-1".to_string(),
            email: "fern@greennest.test".to_string(),
            display_name: display_name.map(str::to_string),
            photo_url: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_greeting_name_falls_back_to_email() {
        assert_eq!(user(Some("Fern")).greeting_name(), "Fern");
        assert_eq!(user(Some("")).greeting_name(), "fern@greennest.test");
        assert_eq!(user(None).greeting_name(), "fern@greennest.test");
    }

    #[test]
    fn test_profile_update_from_form_drops_blank_fields() {
        let update = ProfileUpdate::from_form("  Fern ", "");
        assert_eq!(update.display_name.as_deref(), Some("Fern"));
        assert_eq!(update.photo_url, None);
    }

    #[test]
    fn test_user_serializes_with_original_field_names() {
        let json = serde_json::to_value(user(Some("Fern"))).unwrap();
        assert_eq!(json["displayName"], "Fern");
        assert!(json.get("photoURL").is_some());
        assert!(json.get("createdAt").is_some());
    }

    #[test]
    fn test_default_session_is_loading() {
        let session = Session::default();
        assert!(session.is_loading);
        assert!(!session.is_signed_in());
    }
}

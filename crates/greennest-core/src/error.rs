//! Error types for GreenNest.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A shared error type for every GreenNest crate.
///
/// The first block of variants is the authentication and catalog taxonomy the
/// UI layer distinguishes. The rest are ambient failures from I/O,
/// serialization and configuration.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GreenNestError {
    /// An account already exists for this email address
    #[error("An account already exists for this email")]
    DuplicateAccount,

    /// The password does not satisfy the password policy
    #[error("Password does not meet the password policy")]
    WeakPassword,

    /// The email address is empty or malformed
    #[error("Invalid email address")]
    InvalidEmail,

    /// No account exists for this email address
    #[error("No account found for this email")]
    UserNotFound,

    /// The password does not match the account
    #[error("Wrong credentials")]
    WrongCredentials,

    /// The provider is throttling this account after repeated failures
    #[error("Too many failed attempts")]
    TooManyAttempts,

    /// Federated consent flow was cancelled, blocked or failed in transit
    #[error("Federated sign-in failed")]
    FederatedSignInFailed,

    /// The operation needs a signed-in user
    #[error("Not authenticated")]
    NotAuthenticated,

    /// The product collection could not be loaded
    #[error("Failed to load product data: {0}")]
    DataLoadFailed(String),

    /// Identity provider failure outside the taxonomy above
    #[error("Identity provider error: {0}")]
    Provider(String),

    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization {
        format: String, // "TOML", "JSON"
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl GreenNestError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates a DataLoadFailed error
    pub fn data_load(message: impl Into<String>) -> Self {
        Self::DataLoadFailed(message.into())
    }

    /// Creates a Provider error
    pub fn provider(message: impl Into<String>) -> Self {
        Self::Provider(message.into())
    }

    /// Creates an IO error
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    /// Returns true for the credential and account failures a sign-in or
    /// sign-up form reports back to the user.
    pub fn is_auth_failure(&self) -> bool {
        matches!(
            self,
            Self::DuplicateAccount
                | Self::WeakPassword
                | Self::InvalidEmail
                | Self::UserNotFound
                | Self::WrongCredentials
                | Self::TooManyAttempts
                | Self::FederatedSignInFailed
                | Self::NotAuthenticated
        )
    }

    /// Check if this is a DataLoadFailed error
    pub fn is_data_load_failure(&self) -> bool {
        matches!(self, Self::DataLoadFailed(_))
    }

    /// The sentence shown to the user for this failure.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::DuplicateAccount => "This email is already registered. Please login instead.",
            Self::WeakPassword => "Password is too weak. Please use a stronger password.",
            Self::InvalidEmail => "Invalid email address format.",
            Self::UserNotFound => "No account found with this email.",
            Self::WrongCredentials => "Incorrect password. Please try again.",
            Self::TooManyAttempts => "Too many failed attempts. Please try again later.",
            Self::FederatedSignInFailed => "Google sign-in failed. Please try again.",
            Self::NotAuthenticated => "Please log in to continue.",
            Self::DataLoadFailed(_) => "Could not load plants. Please refresh the page.",
            _ => "Something went wrong. Please try again.",
        }
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for GreenNestError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for GreenNestError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for GreenNestError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::ser::Error> for GreenNestError {
    fn from(err: toml::ser::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

/// Any HTTP failure while fetching products is a data load failure.
impl From<reqwest::Error> for GreenNestError {
    fn from(err: reqwest::Error) -> Self {
        Self::DataLoadFailed(err.to_string())
    }
}

/// Conversion from anyhow::Error
impl From<anyhow::Error> for GreenNestError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// A type alias for `Result<T, GreenNestError>`.
pub type Result<T> = std::result::Result<T, GreenNestError>;

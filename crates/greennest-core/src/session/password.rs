//! Client-side password policy checked by the sign-up form.

use serde::{Deserialize, Serialize};

/// Minimum password length accepted at sign-up.
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Rules a new password must satisfy before the provider is contacted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PasswordPolicy {
    pub min_length: usize,
    pub require_uppercase: bool,
    pub require_lowercase: bool,
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self {
            min_length: MIN_PASSWORD_LENGTH,
            require_uppercase: true,
            require_lowercase: true,
        }
    }
}

/// Result of checking a password, one flag per requirement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasswordCheck {
    pub has_uppercase: bool,
    pub has_lowercase: bool,
    pub has_min_length: bool,
    /// Length the policy asked for
    pub min_length: usize,
}

impl PasswordCheck {
    pub fn is_valid(&self) -> bool {
        self.has_uppercase && self.has_lowercase && self.has_min_length
    }

    /// Human-readable requirements that are not met yet.
    pub fn unmet(&self) -> Vec<String> {
        let mut unmet = Vec::new();
        if !self.has_uppercase {
            unmet.push("At least one uppercase letter".to_string());
        }
        if !self.has_lowercase {
            unmet.push("At least one lowercase letter".to_string());
        }
        if !self.has_min_length {
            unmet.push(format!("Minimum {} characters", self.min_length));
        }
        unmet
    }
}

impl PasswordPolicy {
    /// Evaluates `password` against every rule. Disabled rules always pass.
    pub fn check(&self, password: &str) -> PasswordCheck {
        PasswordCheck {
            has_uppercase: !self.require_uppercase
                || password.chars().any(|c| c.is_ascii_uppercase()),
            has_lowercase: !self.require_lowercase
                || password.chars().any(|c| c.is_ascii_lowercase()),
            has_min_length: password.chars().count() >= self.min_length,
            min_length: self.min_length,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_mixed_case_password() {
        let check = PasswordPolicy::default().check("Monstera");
        assert!(check.is_valid());
        assert!(check.unmet().is_empty());
    }

    #[test]
    fn test_reports_each_missing_requirement() {
        let check = PasswordPolicy::default().check("abc");
        assert!(!check.is_valid());
        assert_eq!(
            check.unmet(),
            vec!["At least one uppercase letter", "Minimum 6 characters"]
        );
    }

    #[test]
    fn test_unmet_length_follows_policy() {
        let policy = PasswordPolicy {
            min_length: 10,
            ..PasswordPolicy::default()
        };
        assert_eq!(policy.check("Monstera").unmet(), vec!["Minimum 10 characters"]);
    }

    #[test]
    fn test_length_counts_characters() {
        let policy = PasswordPolicy::default();
        assert!(!policy.check("Abcde").has_min_length);
        assert!(policy.check("Abcdef").has_min_length);
    }

    #[test]
    fn test_disabled_rules_pass() {
        let policy = PasswordPolicy {
            min_length: 1,
            require_uppercase: false,
            require_lowercase: false,
        };
        assert!(policy.check("1").is_valid());
    }
}

//! Password strength rules.
//!
//! Checks run in a fixed order and stop at the first failure, so the reason
//! returned for a given password and policy is always the same.

use crate::config::SecurityConfig;
use crate::domain::PolicyError;

/// Characters that satisfy the special-character rule.
pub const SPECIAL_CHARS: &str = "!@#$%^&*(),.?\":{}|<>";

/// Message returned by [`PasswordPolicy::check`] for an accepted password.
pub const PASSWORD_ACCEPTED: &str = "Password accepted";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordPolicy {
    // ---
    pub min_length: usize,
    pub require_special_char: bool,
    pub require_number: bool,
    pub require_uppercase: bool,
}

impl Default for PasswordPolicy {
    /// Length only, minimum 8. Deliberately weak; raise it through configuration.
    fn default() -> Self {
        // ---
        Self {
            min_length: 8,
            require_special_char: false,
            require_number: false,
            require_uppercase: false,
        }
    }
}

impl PasswordPolicy {
    // ---
    pub fn from_config(config: &SecurityConfig) -> Self {
        // ---
        Self {
            min_length: config.min_password_length,
            require_special_char: config.require_special_char,
            require_number: config.require_number,
            require_uppercase: config.require_uppercase,
        }
    }

    /// Validate a candidate password.
    ///
    /// Order: length, special character, digit, uppercase.
    pub fn validate(&self, password: &str) -> Result<(), PolicyError> {
        // ---
        if password.chars().count() < self.min_length {
            return Err(PolicyError::TooShort {
                min_length: self.min_length,
            });
        }

        if self.require_special_char && !password.chars().any(|c| SPECIAL_CHARS.contains(c)) {
            return Err(PolicyError::MissingSpecialChar);
        }

        if self.require_number && !password.chars().any(char::is_numeric) {
            return Err(PolicyError::MissingNumber);
        }

        if self.require_uppercase && !password.chars().any(char::is_uppercase) {
            return Err(PolicyError::MissingUppercase);
        }

        Ok(())
    }

    /// `(ok, reason)` form of [`validate`](Self::validate) for UI callers.
    pub fn check(&self, password: &str) -> (bool, String) {
        // ---
        match self.validate(password) {
            Ok(()) => (true, PASSWORD_ACCEPTED.to_string()),
            Err(e) => (false, e.to_string()),
        }
    }
}

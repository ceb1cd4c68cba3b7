//! Error taxonomy for the auth core.
//!
//! Every operation returns one of these explicitly. Only the variants whose
//! text is safe for an end user (policy reasons, the generic credential
//! failure, lockout) are meant to be displayed verbatim; everything else is
//! logged and replaced by a generic message at the UI boundary.

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Any failure of the underlying record store.
#[derive(Debug, Error)]
pub enum StorageError {
    // ---
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Invalid SQL identifier: {0:?}")]
    InvalidIdentifier(String),

    #[error("Invalid statement: {0}")]
    InvalidStatement(String),

    #[error("Corrupt row in {table}: {reason}")]
    CorruptRow { table: &'static str, reason: String },
}

/// Password rejected by the configured policy. The message is user-facing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PolicyError {
    // ---
    #[error("Password must be at least {min_length} characters long")]
    TooShort { min_length: usize },

    #[error("Password must contain a special character")]
    MissingSpecialChar,

    #[error("Password must contain a number")]
    MissingNumber,

    #[error("Password must contain an uppercase letter")]
    MissingUppercase,
}

/// Token verification failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    // ---
    #[error("Token expired")]
    Expired,

    #[error("Invalid token")]
    Invalid,

    #[error("Token signing failed: {0}")]
    Signing(String),
}

/// Failures of the Auth Manager's public operations.
#[derive(Debug, Error)]
pub enum AuthError {
    // ---
    /// Never reveals whether the username or the password was wrong.
    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("Account is temporarily locked")]
    AccountLocked { until: DateTime<Utc> },

    #[error("Username already exists")]
    UsernameTaken,

    #[error(transparent)]
    Policy(#[from] PolicyError),

    #[error(transparent)]
    Token(#[from] TokenError),

    #[error("Password hashing failed: {0}")]
    Hashing(String),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl AuthError {
    // ---
    /// True for failures whose text may be shown to the person at the keyboard.
    pub fn is_user_facing(&self) -> bool {
        // ---
        matches!(
            self,
            AuthError::InvalidCredentials
                | AuthError::AccountLocked { .. }
                | AuthError::UsernameTaken
                | AuthError::Policy(_)
        )
    }
}

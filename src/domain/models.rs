use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Coarse-grained role tag carried by every user and every token.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    // ---
    Admin,
    #[default]
    User,
}

impl Role {
    // ---
    pub fn as_str(&self) -> &'static str {
        // ---
        match self {
            Role::Admin => "admin",
            Role::User => "user",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown role: {0}")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // ---
        match s {
            "admin" => Ok(Role::Admin),
            "user" => Ok(Role::User),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

/// A stored account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    // ---
    pub id: i64,
    pub username: String,

    /// Argon2id PHC string. Never serialized.
    #[serde(skip_serializing)]
    pub password_hash: String,

    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,

    /// Consecutive failed logins since the last success.
    pub login_attempts: u32,

    /// Authentication is refused while this lies in the future.
    pub locked_until: Option<DateTime<Utc>>,

    pub password_changed_at: Option<DateTime<Utc>>,
    pub requires_password_change: bool,
}

/// Values for a row about to be inserted into `users`.
#[derive(Debug, Clone)]
pub struct NewUser {
    // ---
    pub username: String,
    pub password_hash: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub password_changed_at: DateTime<Utc>,
}

/// Actions the core records. The persisted column is free text, so
/// readers must accept tags outside this set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuditAction {
    // ---
    UserRegistered,
    UserLogin,
    LoginFailed,
    AccountLocked,
    PasswordChanged,
}

impl AuditAction {
    // ---
    pub fn as_str(&self) -> &'static str {
        // ---
        match self {
            AuditAction::UserRegistered => "USER_REGISTERED",
            AuditAction::UserLogin => "USER_LOGIN",
            AuditAction::LoginFailed => "LOGIN_FAILED",
            AuditAction::AccountLocked => "ACCOUNT_LOCKED",
            AuditAction::PasswordChanged => "PASSWORD_CHANGED",
        }
    }
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An immutable row of `audit_log`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuditLogEntry {
    // ---
    pub id: i64,
    pub timestamp: DateTime<Utc>,

    /// Absent when the actor was never identified (e.g. unknown username).
    pub user_id: Option<i64>,

    pub action: String,
    pub details: Option<String>,
    pub ip_address: Option<String>,
}

/// Values for a row about to be appended to `audit_log`.
#[derive(Debug, Clone)]
pub struct NewAuditEntry {
    // ---
    pub timestamp: DateTime<Utc>,
    pub user_id: Option<i64>,
    pub action: AuditAction,
    pub details: String,
    pub ip_address: Option<String>,
}

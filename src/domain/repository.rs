use super::errors::StorageError;
use super::models::{AuditLogEntry, NewAuditEntry, NewUser, User};
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// Abstraction for user and audit persistence.
///
/// Each method issues a single statement that commits on its own; nothing
/// spans both tables transactionally.
#[async_trait::async_trait]
pub trait CredentialStore: Send + Sync {
    // ---
    /// Exact, case-sensitive lookup.
    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, StorageError>;

    async fn find_user_by_id(&self, user_id: i64) -> Result<Option<User>, StorageError>;

    /// Insert a user and return its assigned id. A duplicate username
    /// violates the table's UNIQUE constraint and surfaces as an error.
    async fn insert_user(&self, user: NewUser) -> Result<i64, StorageError>;

    /// Persist the lockout counter and lock expiry computed by the tracker.
    async fn update_lockout(
        &self,
        user_id: i64,
        login_attempts: u32,
        locked_until: Option<DateTime<Utc>>,
    ) -> Result<(), StorageError>;

    async fn update_last_login(&self, user_id: i64, at: DateTime<Utc>) -> Result<(), StorageError>;

    /// Replace the password hash, stamp `password_changed_at` and clear
    /// `requires_password_change`.
    async fn update_password(
        &self,
        user_id: i64,
        password_hash: &str,
        changed_at: DateTime<Utc>,
    ) -> Result<(), StorageError>;

    /// Replace only the stored hash, as when upgrading its format. The
    /// password itself is unchanged, so `password_changed_at` is left alone.
    async fn update_password_hash(
        &self,
        user_id: i64,
        password_hash: &str,
    ) -> Result<(), StorageError>;

    async fn set_requires_password_change(
        &self,
        user_id: i64,
        required: bool,
    ) -> Result<(), StorageError>;

    /// Append an audit row and return its id.
    async fn insert_audit_entry(&self, entry: NewAuditEntry) -> Result<i64, StorageError>;

    /// Newest first. Exists for export tooling and tests; the core never reads it.
    async fn recent_audit_entries(&self, limit: u32) -> Result<Vec<AuditLogEntry>, StorageError>;
}

/// Type alias for any backend that implements CredentialStore.
pub type CredentialStorePtr = Arc<dyn CredentialStore>;

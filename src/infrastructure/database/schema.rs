//! Persisted schema: the only durable contract of the auth core.

use super::record_store::RecordStore;
use crate::domain::StorageError;

pub(crate) const CREATE_USERS: &str = "
CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY,
    username TEXT UNIQUE NOT NULL,
    password_hash TEXT NOT NULL,
    role TEXT NOT NULL,
    created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
    last_login TIMESTAMP,
    login_attempts INTEGER DEFAULT 0,
    locked_until TIMESTAMP,
    password_changed_at TIMESTAMP,
    requires_password_change BOOLEAN DEFAULT FALSE
)";

pub(crate) const CREATE_AUDIT_LOG: &str = "
CREATE TABLE IF NOT EXISTS audit_log (
    id INTEGER PRIMARY KEY,
    timestamp TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
    user_id INTEGER,
    action TEXT NOT NULL,
    details TEXT,
    ip_address TEXT,
    FOREIGN KEY (user_id) REFERENCES users(id)
)";

/// Create both tables if they are missing. Safe to call on every start.
pub async fn init_schema(records: &RecordStore) -> Result<(), StorageError> {
    // ---
    records.execute(CREATE_USERS, &[]).await?;
    records.execute(CREATE_AUDIT_LOG, &[]).await?;

    tracing::debug!("Auth schema ready");
    Ok(())
}

use chrono::{DateTime, Utc};

use super::record_store::{RecordStore, SqlValue};
use crate::domain::{
    AuditLogEntry, CredentialStore, NewAuditEntry, NewUser, Role, StorageError, User,
};

const USER_COLUMNS: &str = "id, username, password_hash, role, created_at, last_login, \
     login_attempts, locked_until, password_changed_at, requires_password_change";

#[derive(sqlx::FromRow)]
struct UserRow {
    id: i64,
    username: String,
    password_hash: String,
    role: String,
    created_at: Option<DateTime<Utc>>,
    last_login: Option<DateTime<Utc>>,
    login_attempts: Option<i64>,
    locked_until: Option<DateTime<Utc>>,
    password_changed_at: Option<DateTime<Utc>>,
    requires_password_change: Option<bool>,
}

impl TryFrom<UserRow> for User {
    type Error = StorageError;

    fn try_from(r: UserRow) -> Result<Self, Self::Error> {
        // ---
        let role = r.role.parse::<Role>().map_err(|e| StorageError::CorruptRow {
            table: "users",
            reason: e.to_string(),
        })?;

        let created_at = r.created_at.ok_or_else(|| StorageError::CorruptRow {
            table: "users",
            reason: format!("user {} has no created_at", r.id),
        })?;

        // Negative counters can only come from hand-edited rows; treat as zero.
        let login_attempts = u32::try_from(r.login_attempts.unwrap_or(0).max(0)).unwrap_or(u32::MAX);

        Ok(User {
            id: r.id,
            username: r.username,
            password_hash: r.password_hash,
            role,
            created_at,
            last_login: r.last_login,
            login_attempts,
            locked_until: r.locked_until,
            password_changed_at: r.password_changed_at,
            requires_password_change: r.requires_password_change.unwrap_or(false),
        })
    }
}

#[derive(sqlx::FromRow)]
struct AuditRow {
    id: i64,
    timestamp: DateTime<Utc>,
    user_id: Option<i64>,
    action: String,
    details: Option<String>,
    ip_address: Option<String>,
}

impl From<AuditRow> for AuditLogEntry {
    fn from(r: AuditRow) -> Self {
        // ---
        Self {
            id: r.id,
            timestamp: r.timestamp,
            user_id: r.user_id,
            action: r.action,
            details: r.details,
            ip_address: r.ip_address,
        }
    }
}

pub struct SqliteCredentialStore {
    // ---
    records: RecordStore,
}

impl SqliteCredentialStore {
    // ---
    pub fn new(records: RecordStore) -> Self {
        // ---
        Self { records }
    }
}

#[async_trait::async_trait]
impl CredentialStore for SqliteCredentialStore {
    // ---
    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, StorageError> {
        // ---
        let statement = format!("SELECT {USER_COLUMNS} FROM users WHERE username = ?");
        let row = self
            .records
            .fetch_optional::<UserRow>(&statement, &[username.into()])
            .await?;

        row.map(User::try_from).transpose()
    }

    async fn find_user_by_id(&self, user_id: i64) -> Result<Option<User>, StorageError> {
        // ---
        let statement = format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?");
        let row = self
            .records
            .fetch_optional::<UserRow>(&statement, &[user_id.into()])
            .await?;

        row.map(User::try_from).transpose()
    }

    async fn insert_user(&self, user: NewUser) -> Result<i64, StorageError> {
        // ---
        self.records
            .insert(
                "users",
                &[
                    ("username", user.username.into()),
                    ("password_hash", user.password_hash.into()),
                    ("role", user.role.as_str().into()),
                    ("created_at", user.created_at.into()),
                    ("login_attempts", SqlValue::Integer(0)),
                    ("password_changed_at", user.password_changed_at.into()),
                    ("requires_password_change", false.into()),
                ],
            )
            .await
    }

    async fn update_lockout(
        &self,
        user_id: i64,
        login_attempts: u32,
        locked_until: Option<DateTime<Utc>>,
    ) -> Result<(), StorageError> {
        // ---
        self.records
            .execute(
                "UPDATE users SET login_attempts = ?, locked_until = ? WHERE id = ?",
                &[login_attempts.into(), locked_until.into(), user_id.into()],
            )
            .await?;

        Ok(())
    }

    async fn update_last_login(&self, user_id: i64, at: DateTime<Utc>) -> Result<(), StorageError> {
        // ---
        self.records
            .execute(
                "UPDATE users SET last_login = ? WHERE id = ?",
                &[at.into(), user_id.into()],
            )
            .await?;

        Ok(())
    }

    async fn update_password(
        &self,
        user_id: i64,
        password_hash: &str,
        changed_at: DateTime<Utc>,
    ) -> Result<(), StorageError> {
        // ---
        self.records
            .execute(
                "UPDATE users
                 SET password_hash = ?, password_changed_at = ?, requires_password_change = ?
                 WHERE id = ?",
                &[password_hash.into(), changed_at.into(), false.into(), user_id.into()],
            )
            .await?;

        Ok(())
    }

    async fn update_password_hash(
        &self,
        user_id: i64,
        password_hash: &str,
    ) -> Result<(), StorageError> {
        // ---
        self.records
            .execute(
                "UPDATE users SET password_hash = ? WHERE id = ?",
                &[password_hash.into(), user_id.into()],
            )
            .await?;

        Ok(())
    }

    async fn set_requires_password_change(
        &self,
        user_id: i64,
        required: bool,
    ) -> Result<(), StorageError> {
        // ---
        self.records
            .execute(
                "UPDATE users SET requires_password_change = ? WHERE id = ?",
                &[required.into(), user_id.into()],
            )
            .await?;

        Ok(())
    }

    async fn insert_audit_entry(&self, entry: NewAuditEntry) -> Result<i64, StorageError> {
        // ---
        self.records
            .insert(
                "audit_log",
                &[
                    ("timestamp", entry.timestamp.into()),
                    ("user_id", entry.user_id.into()),
                    ("action", entry.action.as_str().into()),
                    ("details", entry.details.into()),
                    ("ip_address", entry.ip_address.into()),
                ],
            )
            .await
    }

    async fn recent_audit_entries(&self, limit: u32) -> Result<Vec<AuditLogEntry>, StorageError> {
        // ---
        let rows = self
            .records
            .fetch_all::<AuditRow>(
                "SELECT id, timestamp, user_id, action, details, ip_address
                 FROM audit_log ORDER BY id DESC LIMIT ?",
                &[limit.into()],
            )
            .await?;

        Ok(rows.into_iter().map(AuditLogEntry::from).collect())
    }
}

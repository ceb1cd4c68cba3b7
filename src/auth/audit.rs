use crate::domain::{AuditAction, ClockPtr, CredentialStorePtr, NewAuditEntry};

/// Best-effort writer for the `audit_log` table.
///
/// A failed write is logged and swallowed; it never fails the operation
/// being audited.
#[derive(Clone)]
pub struct AuditLog {
    // ---
    store: CredentialStorePtr,
    clock: ClockPtr,
}

impl AuditLog {
    // ---
    pub fn new(store: CredentialStorePtr, clock: ClockPtr) -> Self {
        Self { store, clock }
    }

    /// Returns the new entry's id, or `None` if the write failed.
    pub async fn append(
        &self,
        user_id: Option<i64>,
        action: AuditAction,
        details: impl Into<String>,
        ip_address: Option<&str>,
    ) -> Option<i64> {
        // ---
        let entry = NewAuditEntry {
            timestamp: self.clock.now(),
            user_id,
            action,
            details: details.into(),
            ip_address: ip_address.map(str::to_string),
        };

        match self.store.insert_audit_entry(entry).await {
            Ok(id) => Some(id),
            Err(e) => {
                tracing::error!("Failed to write {} audit entry: {:?}", action, e);
                None
            }
        }
    }
}

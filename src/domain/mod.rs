mod clock;
mod errors;
mod metrics;
mod models;
mod repository;

// Publicly expose the time source abstraction
pub use clock::{Clock, ClockPtr, ManualClock, SystemClock};

// Publicly expose the error taxonomy
pub use errors::{AuthError, PolicyError, StorageError, TokenError};

// Publicly expose the Metrics abstraction
pub use metrics::{LoginOutcome, Metrics, MetricsPtr};

// Publicly expose persistence abstractions
pub use models::{AuditAction, AuditLogEntry, NewAuditEntry, NewUser, Role, UnknownRole, User};
pub use repository::{CredentialStore, CredentialStorePtr};

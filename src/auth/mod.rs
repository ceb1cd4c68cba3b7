mod audit;
mod facade;
mod hasher;
mod lockout;
mod manager;
mod password_policy;
mod token;

// Hoist up the auth services
pub use audit::AuditLog;
pub use facade::{AuthFacade, OPERATION_FAILED, REGISTRATION_SUCCESSFUL};
pub use hasher::CredentialHasher;
pub use lockout::{LockState, LockoutStatus, LockoutTracker, LockoutUpdate};
pub use manager::{AuthManager, DEFAULT_ADMIN_PASSWORD, DEFAULT_ADMIN_USERNAME};
pub use password_policy::{PasswordPolicy, PASSWORD_ACCEPTED, SPECIAL_CHARS};
pub use token::{Claims, TokenPayload, TokenService};

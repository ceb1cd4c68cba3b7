//! Tuple-shaped entry points for the login dialog and other UI callers.
//!
//! Each call collapses a `Result` into `(success, text)`. Only user-facing
//! failures keep their own message; anything else is logged here and
//! reported as [`OPERATION_FAILED`].

use serde_json::{json, Value};
use std::sync::Arc;

use super::AuthManager;
use crate::domain::{AuthError, Role};

pub const REGISTRATION_SUCCESSFUL: &str = "Registration successful";
pub const OPERATION_FAILED: &str = "Operation failed";

#[derive(Clone)]
pub struct AuthFacade {
    // ---
    manager: Arc<AuthManager>,
}

impl AuthFacade {
    // ---
    pub fn new(manager: Arc<AuthManager>) -> Self {
        Self { manager }
    }

    /// `role` is the stored tag (`"user"` or `"admin"`).
    pub async fn register(&self, username: &str, password: &str, role: &str) -> (bool, String) {
        // ---
        let role: Role = match role.parse() {
            Ok(role) => role,
            Err(e) => return (false, format!("{e}")),
        };

        match self.manager.register(username, password, role).await {
            Ok(_) => (true, REGISTRATION_SUCCESSFUL.to_string()),
            Err(e) => (false, user_message("Registration", e)),
        }
    }

    /// On success the second element is the token.
    pub async fn authenticate(
        &self,
        username: &str,
        password: &str,
        source_address: Option<&str>,
    ) -> (bool, String) {
        // ---
        match self
            .manager
            .authenticate(username, password, source_address)
            .await
        {
            Ok(token) => (true, token),
            Err(e) => (false, user_message("Login", e)),
        }
    }

    /// `{"user_id", "role"}` for a valid token, `{"error": ...}` otherwise.
    pub fn verify(&self, token: &str) -> (bool, Value) {
        // ---
        match self.manager.verify(token) {
            Ok(payload) => (true, json!({ "user_id": payload.user_id, "role": payload.role })),
            Err(e) => (false, json!({ "error": e.to_string() })),
        }
    }

    pub async fn change_password(
        &self,
        username: &str,
        current_password: &str,
        new_password: &str,
    ) -> (bool, String) {
        // ---
        match self
            .manager
            .change_password(username, current_password, new_password)
            .await
        {
            Ok(()) => (true, "Password changed".to_string()),
            Err(e) => (false, user_message("Password change", e)),
        }
    }
}

fn user_message(operation: &str, error: AuthError) -> String {
    // ---
    if error.is_user_facing() {
        return error.to_string();
    }

    tracing::error!("{} failed: {:?}", operation, error);
    OPERATION_FAILED.to_string()
}

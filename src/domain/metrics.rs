use std::sync::Arc;
use std::time::Instant;

/// How a login attempt ended, used as a metrics label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginOutcome {
    // ---
    Success,
    InvalidCredentials,
    Locked,
}

impl LoginOutcome {
    // ---
    pub fn as_str(&self) -> &'static str {
        // ---
        match self {
            LoginOutcome::Success => "success",
            LoginOutcome::InvalidCredentials => "invalid_credentials",
            LoginOutcome::Locked => "locked",
        }
    }
}

/// Abstraction for application metrics (counters, histograms).
pub trait Metrics: Send + Sync + 'static {
    // ---
    /// Render current metrics in Prometheus text format.
    fn render(&self) -> String;

    /// Record a successful registration.
    fn record_registration(&self);

    /// Record the outcome of one authentication attempt.
    fn record_login(&self, outcome: LoginOutcome);

    /// Record an account transitioning to LOCKED.
    fn record_lockout(&self);

    /// Record how long one password hash or verification took.
    fn record_password_hash(&self, start: Instant);
}

/// Type alias for any backend that implements Metrics.
pub type MetricsPtr = Arc<dyn Metrics>;

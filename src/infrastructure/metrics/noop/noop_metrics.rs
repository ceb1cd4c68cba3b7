use crate::domain::{LoginOutcome, Metrics};
use std::time::Instant;

/// No-op metrics implementation for tests and for builds without an exporter.
pub struct NoopMetrics;

impl NoopMetrics {
    pub fn new() -> Self {
        NoopMetrics
    }
}

impl Default for NoopMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics for NoopMetrics {
    // ---
    fn render(&self) -> String {
        String::new()
    }
    fn record_registration(&self) {}
    fn record_login(&self, _: LoginOutcome) {}
    fn record_lockout(&self) {}
    fn record_password_hash(&self, _: Instant) {}
}

//! Prometheus metrics implementation.
//!
//! This module provides a concrete implementation of the `Metrics` trait using
//! the Prometheus metrics format. It delegates to utility functions in sibling
//! modules (`counters.rs`, `recorder.rs`) which handle the actual metrics
//! collection via the global `metrics` crate registry.

use crate::domain::{LoginOutcome, Metrics};
use std::time::Instant;

/// Prometheus-based metrics implementation.
///
/// Empty because the `metrics` crate keeps a global registry; the handle
/// in `recorder.rs` renders it.
pub struct PrometheusMetrics {}

impl PrometheusMetrics {
    pub fn new() -> Self {
        tracing::info!("Creating Prometheus metrics");
        PrometheusMetrics {}
    }
}

impl Metrics for PrometheusMetrics {
    fn render(&self) -> String {
        super::render_metrics()
    }

    fn record_registration(&self) {
        tracing::debug!("Recording registration");
        super::increment_registrations();
    }

    fn record_login(&self, outcome: LoginOutcome) {
        tracing::debug!("Recording login outcome {}", outcome.as_str());
        super::increment_logins(outcome.as_str());
    }

    fn record_lockout(&self) {
        super::increment_lockouts();
    }

    fn record_password_hash(&self, start: Instant) {
        super::track_password_hash(start);
    }
}

mod counters;
mod prometheus_metrics;
mod recorder;

pub use prometheus_metrics::PrometheusMetrics;
use std::sync::Arc;

// Re-export utilities for internal use within this module
pub(crate) use counters::{
    increment_lockouts, increment_logins, increment_registrations, track_password_hash,
};
pub(crate) use recorder::{init_metrics, render_metrics};

/// Creates a new Prometheus metrics implementation.
///
/// Installs the process-wide recorder, so it can succeed only once per process.
pub fn create() -> anyhow::Result<crate::domain::MetricsPtr> {
    tracing::info!("Initializing Prometheus metrics");
    init_metrics()?;

    Ok(Arc::new(PrometheusMetrics::new()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::LoginOutcome;

    // The only test in the crate that installs the global recorder.
    #[test]
    fn test_create_and_render() {
        let metrics = create().expect("recorder should install once");

        metrics.record_registration();
        metrics.record_login(LoginOutcome::Success);
        metrics.record_login(LoginOutcome::Locked);
        metrics.record_lockout();

        let text = metrics.render();
        assert!(text.contains("auth_registrations_total"));
        assert!(text.contains("auth_login_failures_total"));
        assert!(text.contains("auth_lockouts_total"));

        assert!(create().is_err(), "second recorder must be refused");
    }
}

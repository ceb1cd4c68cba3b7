// src/infrastructure/metrics/noop/mod.rs
mod noop_metrics;

pub use noop_metrics::NoopMetrics;
use std::sync::Arc;

/// Creates the metrics backend used when `AUTH_METRICS_TYPE` is unset.
///
/// Counters and histograms are discarded and `render()` is empty. Test
/// harnesses use it so that no global recorder gets installed.
pub fn create() -> anyhow::Result<crate::domain::MetricsPtr> {
    Ok(Arc::new(NoopMetrics::new()))
}

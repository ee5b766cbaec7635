//! Metrics collection and exposition.
//!
//! # Metrics
//! - `loadbalancer_strategy_selections` (counter): successful backend
//!   selections, by strategy
//! - `loadbalancer_strategy_no_healthy_backends` (counter): calls that found
//!   no healthy candidate, by strategy
//! - `loadbalancer_strategy_selection_time_seconds` (histogram): wall-clock
//!   duration of selection calls, by strategy
//!
//! # Design Decisions
//! - The strategy talks to a narrow `StrategyMetrics` trait; the shipped
//!   implementation forwards to the `metrics` crate facade, so the actual
//!   recorder (Prometheus, statsd, a test stub) stays external
//! - `init_metrics` installs the Prometheus exporter for deployments that
//!   want scrape-based exposition out of the box

use std::net::SocketAddr;
use std::time::Duration;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Counter of successful backend selections.
pub const SELECTIONS_METRIC: &str = "loadbalancer_strategy_selections";

/// Counter of selection calls that found no healthy backend.
pub const NO_HEALTHY_BACKENDS_METRIC: &str = "loadbalancer_strategy_no_healthy_backends";

/// Histogram of selection call durations.
pub const SELECTION_TIME_METRIC: &str = "loadbalancer_strategy_selection_time_seconds";

const STRATEGY_LABEL: &str = "strategy";

/// Sink for the events a load balancing strategy emits.
///
/// Implementations must be cheap and safe to call from many selection
/// calls at once.
pub trait StrategyMetrics: Send + Sync {
    /// A backend was successfully selected.
    fn record_selection(&self, strategy: &str);

    /// A selection call found no healthy candidate.
    fn record_no_healthy_backends(&self, strategy: &str);

    /// Wall-clock duration of one selection call.
    fn record_selection_time(&self, strategy: &str, elapsed: Duration);
}

/// [`StrategyMetrics`] implementation backed by the `metrics` crate facade.
///
/// Events land in whatever recorder the process has installed; without one
/// they are dropped, which keeps the core usable in tests and embedders
/// that bring their own telemetry.
#[derive(Debug, Clone, Copy, Default)]
pub struct MetricsFacade;

impl StrategyMetrics for MetricsFacade {
    fn record_selection(&self, strategy: &str) {
        counter!(SELECTIONS_METRIC, STRATEGY_LABEL => strategy.to_owned()).increment(1);
    }

    fn record_no_healthy_backends(&self, strategy: &str) {
        counter!(NO_HEALTHY_BACKENDS_METRIC, STRATEGY_LABEL => strategy.to_owned()).increment(1);
    }

    fn record_selection_time(&self, strategy: &str, elapsed: Duration) {
        histogram!(SELECTION_TIME_METRIC, STRATEGY_LABEL => strategy.to_owned())
            .record(elapsed.as_secs_f64());
    }
}

/// Install the Prometheus exporter and start its scrape endpoint.
///
/// Must run inside a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(err) => tracing::error!(error = %err, "Failed to install metrics exporter"),
    }
}

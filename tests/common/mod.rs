//! Shared fixtures for integration tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, SystemTime};

use balancer_core::{Backend, BackendSnapshot, StrategyMetrics};
use url::Url;

/// Healthy backend fixture.
pub fn healthy_backend(url: &str, weight: u64) -> Backend {
    Backend::new(
        Url::parse(url).unwrap(),
        true,
        SystemTime::now(),
        None,
        0,
        weight,
    )
    .unwrap()
}

/// Unhealthy backend fixture.
#[allow(dead_code)]
pub fn unhealthy_backend(url: &str, weight: u64) -> Backend {
    Backend::new(
        Url::parse(url).unwrap(),
        false,
        SystemTime::now(),
        Some("probe timeout".into()),
        0,
        weight,
    )
    .unwrap()
}

/// Snapshot future resolving to the given pool.
pub fn snapshot(backends: Vec<Backend>) -> Option<BackendSnapshot> {
    let fut: BackendSnapshot = Box::pin(async move { Ok(backends) });
    Some(fut)
}

/// Snapshot future that fails, standing in for a broken registry fetch.
#[allow(dead_code)]
pub fn failing_snapshot(message: &'static str) -> Option<BackendSnapshot> {
    let fut: BackendSnapshot = Box::pin(async move { Err(message.into()) });
    Some(fut)
}

/// Counting metrics sink for asserting event emission.
#[derive(Default)]
pub struct CountingMetrics {
    pub selections: AtomicUsize,
    pub no_healthy: AtomicUsize,
    pub timings: AtomicUsize,
}

impl StrategyMetrics for CountingMetrics {
    fn record_selection(&self, _strategy: &str) {
        self.selections.fetch_add(1, Ordering::SeqCst);
    }

    fn record_no_healthy_backends(&self, _strategy: &str) {
        self.no_healthy.fetch_add(1, Ordering::SeqCst);
    }

    fn record_selection_time(&self, _strategy: &str, _elapsed: Duration) {
        self.timings.fetch_add(1, Ordering::SeqCst);
    }
}

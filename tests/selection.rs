//! End-to-end selection behavior for the weighted round-robin strategy.

mod common;

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use balancer_core::config::{BalancerConfig, RefreshConfig};
use balancer_core::strategy::weight::WeightUpdater;
use balancer_core::{Backend, SelectionError, WeightedRoundRobin};

use common::{failing_snapshot, healthy_backend, snapshot, unhealthy_backend, CountingMetrics};

/// Pass-through updater: keeps whatever weight the snapshot carries.
struct IdentityUpdater;

impl WeightUpdater for IdentityUpdater {
    fn update_weight(&self, backend: &Backend) -> u64 {
        backend.weight()
    }
}

fn strategy_with(metrics: Arc<CountingMetrics>) -> WeightedRoundRobin {
    WeightedRoundRobin::new(metrics, Arc::new(IdentityUpdater), RefreshConfig::default())
}

#[tokio::test]
async fn test_selects_only_from_healthy_subset() {
    let metrics = Arc::new(CountingMetrics::default());
    let strategy = strategy_with(metrics.clone());

    let pool = vec![
        healthy_backend("http://a:8080", 2),
        unhealthy_backend("http://b:8080", 9),
        healthy_backend("http://c:8080", 1),
    ];

    for _ in 0..50 {
        let selected = strategy
            .select(snapshot(pool.clone()))
            .await
            .unwrap()
            .expect("healthy backends present");
        assert!(selected.is_healthy());
        assert_ne!(selected.url().as_str(), "http://b:8080/");
    }

    assert_eq!(metrics.selections.load(Ordering::SeqCst), 50);
    assert_eq!(metrics.no_healthy.load(Ordering::SeqCst), 0);
    assert_eq!(metrics.timings.load(Ordering::SeqCst), 50);
}

#[tokio::test]
async fn test_single_healthy_backend_is_always_chosen() {
    let metrics = Arc::new(CountingMetrics::default());
    let strategy = strategy_with(metrics.clone());

    let pool = vec![
        healthy_backend("http://only:8080", 1),
        unhealthy_backend("http://down:8080", 5),
    ];

    for _ in 0..5 {
        let selected = strategy.select(snapshot(pool.clone())).await.unwrap().unwrap();
        assert_eq!(selected.url().as_str(), "http://only:8080/");
    }
    assert_eq!(metrics.selections.load(Ordering::SeqCst), 5);
}

#[tokio::test]
async fn test_empty_pool_counts_no_healthy_once_per_call() {
    let metrics = Arc::new(CountingMetrics::default());
    let strategy = strategy_with(metrics.clone());

    for call in 1..=3 {
        let result = strategy.select(snapshot(Vec::new())).await.unwrap();
        assert!(result.is_none());
        assert_eq!(metrics.no_healthy.load(Ordering::SeqCst), call);
    }
    assert_eq!(metrics.selections.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_all_unhealthy_counts_no_healthy_once_per_call() {
    let metrics = Arc::new(CountingMetrics::default());
    let strategy = strategy_with(metrics.clone());

    let pool = vec![
        unhealthy_backend("http://a:8080", 2),
        unhealthy_backend("http://b:8080", 1),
    ];

    for call in 1..=3 {
        let result = strategy.select(snapshot(pool.clone())).await.unwrap();
        assert!(result.is_none());
        assert_eq!(metrics.no_healthy.load(Ordering::SeqCst), call);
    }
}

#[tokio::test]
async fn test_fetch_failure_degrades_to_empty_result() {
    let metrics = Arc::new(CountingMetrics::default());
    let strategy = strategy_with(metrics.clone());

    let result = strategy
        .select(failing_snapshot("registry unreachable"))
        .await
        .unwrap();

    assert!(result.is_none());
    assert_eq!(metrics.no_healthy.load(Ordering::SeqCst), 1);
    assert_eq!(metrics.selections.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_missing_source_fails_distinctly() {
    let metrics = Arc::new(CountingMetrics::default());
    let strategy = strategy_with(metrics.clone());

    let err = strategy.select(None).await.unwrap_err();
    assert!(matches!(err, SelectionError::MissingSnapshotSource));

    // Caller misuse is not a degraded condition and is not timed.
    assert_eq!(metrics.no_healthy.load(Ordering::SeqCst), 0);
    assert_eq!(metrics.timings.load(Ordering::SeqCst), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_weighted_split_converges_under_concurrency() {
    let metrics = Arc::new(CountingMetrics::default());
    let strategy = Arc::new(strategy_with(metrics.clone()));

    let pool = vec![
        healthy_backend("http://a:8080", 2),
        healthy_backend("http://b:8080", 1),
    ];

    let mut tasks = tokio::task::JoinSet::new();
    for _ in 0..3000 {
        let strategy = strategy.clone();
        let pool = pool.clone();
        tasks.spawn(async move {
            strategy
                .select(snapshot(pool))
                .await
                .unwrap()
                .expect("pool is healthy")
        });
    }

    let mut counts: HashMap<String, usize> = HashMap::new();
    while let Some(selected) = tasks.join_next().await {
        *counts.entry(selected.unwrap().url().to_string()).or_default() += 1;
    }

    let a = counts.get("http://a:8080/").copied().unwrap_or(0);
    let b = counts.get("http://b:8080/").copied().unwrap_or(0);
    assert_eq!(a + b, 3000);

    // 2:1 weights → expect ~2000/~1000, within ±10% of the total draw.
    assert!((1700..=2300).contains(&a), "backend a selected {a} times");
    assert!((700..=1300).contains(&b), "backend b selected {b} times");
    assert_eq!(metrics.selections.load(Ordering::SeqCst), 3000);
}

#[tokio::test]
async fn test_decay_strategy_built_from_config() {
    let metrics = Arc::new(CountingMetrics::default());
    let strategy = WeightedRoundRobin::from_config(&BalancerConfig::default(), metrics).unwrap();

    let pool = vec![
        healthy_backend("http://a:8080", 1),
        healthy_backend("http://b:8080", 1),
    ];

    // Never-evaluated backends decay to the floor on the first pass.
    let first = strategy.select(snapshot(pool.clone())).await.unwrap().unwrap();
    assert_eq!(first.weight(), 1);

    // The first pass recorded fresh timestamps, so the second pass sees
    // near-zero elapsed time and restores the maximum.
    let second = strategy.select(snapshot(pool)).await.unwrap().unwrap();
    assert_eq!(second.weight(), 100);
}

/// Updater that asks for background refresh and counts invocations.
struct RefreshingUpdater {
    calls: AtomicUsize,
}

impl WeightUpdater for RefreshingUpdater {
    fn update_weight(&self, backend: &Backend) -> u64 {
        self.calls.fetch_add(1, Ordering::SeqCst);
        backend.weight()
    }

    fn requires_periodic_refresh(&self) -> bool {
        true
    }
}

#[tokio::test]
async fn test_background_refresh_runs_and_stops_on_shutdown() {
    let updater = Arc::new(RefreshingUpdater {
        calls: AtomicUsize::new(0),
    });
    let scheduler = RefreshConfig {
        initial_delay_secs: 0,
        period_secs: 1,
    };
    let strategy = WeightedRoundRobin::new(
        Arc::new(CountingMetrics::default()),
        updater.clone(),
        scheduler,
    );

    // Seed the cached array through a normal selection.
    strategy
        .select(snapshot(vec![healthy_backend("http://a:8080", 2)]))
        .await
        .unwrap()
        .unwrap();
    let seeded = updater.calls.load(Ordering::SeqCst);

    // Refresh ticks re-invoke the updater without further selection calls.
    tokio::time::sleep(Duration::from_millis(2500)).await;
    assert!(
        updater.calls.load(Ordering::SeqCst) > seeded,
        "background refresh never ran"
    );

    strategy.shutdown().await;
    let stopped = updater.calls.load(Ordering::SeqCst);
    tokio::time::sleep(Duration::from_millis(1500)).await;
    assert_eq!(
        updater.calls.load(Ordering::SeqCst),
        stopped,
        "refresh task kept running after shutdown"
    );
}

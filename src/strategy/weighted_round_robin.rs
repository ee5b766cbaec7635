//! Weighted round-robin selection orchestrator.
//!
//! # Data Flow
//! ```text
//! select() → await snapshot → filter healthy → update weights
//!     → rebuild cumulative array on change (ArcSwap store)
//!     → pick by per-thread cursor mod total weight
//!     → emit selection event, return Backend
//!
//! background refresh (only when the updater asks for it):
//!     initial delay → tick every period
//!     → re-weight the cached sequence → swap in a fresh array
//! ```
//!
//! # Design Decisions
//! - The cached array is an immutable snapshot behind `ArcSwap`: readers
//!   load wait-free, writers build aside and publish with a plain
//!   last-write-wins store. Racing rebuilds may overwrite a slightly newer
//!   array; any array built from a valid filtered+weighted sequence is a
//!   valid selection target, so no compare-and-swap is needed
//! - Selection cursors are thread-local: proportionality holds in aggregate
//!   across calls, not as a strict global round-robin order

use std::cell::Cell;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use arc_swap::ArcSwap;
use futures_util::future::BoxFuture;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use crate::backend::Backend;
use crate::config::{BalancerConfig, RefreshConfig};
use crate::lifecycle::{await_with_grace, Shutdown};
use crate::observability::metrics::StrategyMetrics;
use crate::strategy::registry::{self, RegistryError};
use crate::strategy::weight::WeightUpdater;
use crate::strategy::weighted_array::WeightedBackendArray;
use crate::strategy::{BackendSnapshot, LoadBalancingStrategy, SelectionError};

/// Strategy tag attached to every emitted event.
pub const STRATEGY_NAME: &str = "weighted-round-robin";

/// Grace period granted to the background refresh task on shutdown.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(1);

thread_local! {
    // Per-worker selection cursor. Isolated counters trade strict global
    // ordering for contention-free selection.
    static SELECTION_CURSOR: Cell<u64> = const { Cell::new(0) };
}

/// Weighted round-robin load balancing strategy.
///
/// Selection frequency converges to each backend's relative weight. Weights
/// are recomputed through the configured [`WeightUpdater`] on every call
/// and, when the updater asks for it, by a periodic background task.
pub struct WeightedRoundRobin {
    shared: Arc<Shared>,
    shutdown: Shutdown,
    refresh_task: Mutex<Option<JoinHandle<()>>>,
}

struct Shared {
    metrics: Arc<dyn StrategyMetrics>,
    weight_updater: Arc<dyn WeightUpdater>,
    weighted_array: ArcSwap<WeightedBackendArray>,
}

impl WeightedRoundRobin {
    /// Create the strategy.
    ///
    /// When the updater requires periodic refresh, the background task is
    /// spawned immediately; construction must then happen inside a Tokio
    /// runtime.
    pub fn new(
        metrics: Arc<dyn StrategyMetrics>,
        weight_updater: Arc<dyn WeightUpdater>,
        scheduler: RefreshConfig,
    ) -> Self {
        let shared = Arc::new(Shared {
            metrics,
            weight_updater,
            weighted_array: ArcSwap::from_pointee(WeightedBackendArray::new(Vec::new())),
        });
        let shutdown = Shutdown::new();

        let refresh_task = shared
            .weight_updater
            .requires_periodic_refresh()
            .then(|| Self::spawn_refresh(shared.clone(), scheduler, shutdown.subscribe()));

        Self {
            shared,
            shutdown,
            refresh_task: Mutex::new(refresh_task),
        }
    }

    /// Build the strategy from validated configuration, resolving the
    /// weight updater through the registry.
    pub fn from_config(
        config: &BalancerConfig,
        metrics: Arc<dyn StrategyMetrics>,
    ) -> Result<Self, RegistryError> {
        let updater = registry::build_weight_updater(&config.weight_updater)?;
        Ok(Self::new(metrics, updater, config.refresh))
    }

    fn spawn_refresh(
        shared: Arc<Shared>,
        scheduler: RefreshConfig,
        mut shutdown: broadcast::Receiver<()>,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(scheduler.initial_delay_secs)).await;
            let mut ticker =
                tokio::time::interval(Duration::from_secs(scheduler.period_secs));

            tracing::info!(
                period_secs = scheduler.period_secs,
                "Weight refresh task starting"
            );

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        shared.refresh_weights();
                    }
                    _ = shutdown.recv() => {
                        tracing::info!("Weight refresh task received shutdown signal, exiting loop");
                        break;
                    }
                }
            }
        })
    }

    /// Select one backend from the supplied pool snapshot.
    ///
    /// See [`LoadBalancingStrategy::select_backend`] for the contract; this
    /// is the same operation without the boxing.
    pub async fn select(
        &self,
        backends: Option<BackendSnapshot>,
    ) -> Result<Option<Backend>, SelectionError> {
        let Some(snapshot) = backends else {
            tracing::error!("Backend snapshot source is missing");
            return Err(SelectionError::MissingSnapshotSource);
        };

        let start = Instant::now();
        let result = self.select_from_snapshot(snapshot).await;
        self.shared
            .metrics
            .record_selection_time(STRATEGY_NAME, start.elapsed());
        result
    }

    async fn select_from_snapshot(
        &self,
        snapshot: BackendSnapshot,
    ) -> Result<Option<Backend>, SelectionError> {
        let all = match snapshot.await {
            Ok(backends) => backends,
            Err(err) => {
                // A failed fetch is a degraded condition for the caller,
                // not an error: resolve empty and count it.
                tracing::warn!(error = %err, "Backend snapshot fetch failed, treating as no candidates");
                self.shared.metrics.record_no_healthy_backends(STRATEGY_NAME);
                return Ok(None);
            }
        };

        let healthy = self.filter_healthy(&all);
        let weighted = self.shared.update_weights(healthy)?;

        if weighted.is_empty() {
            tracing::warn!(
                total_backends = all.len(),
                "No healthy backends available"
            );
            self.shared.metrics.record_no_healthy_backends(STRATEGY_NAME);
            return Ok(None);
        }

        if !self.shared.weighted_array.load().matches(&weighted) {
            self.shared
                .weighted_array
                .store(Arc::new(WeightedBackendArray::new(weighted)));
        }

        let array = self.shared.weighted_array.load_full();
        if array.total_weight() == 0 {
            // The empty pool was already handled above; a zero total here
            // means the filter/rebuild sequencing broke.
            tracing::error!("Selection reached a zero-total-weight array");
            return Err(SelectionError::NoPositiveWeights);
        }

        let index = SELECTION_CURSOR.with(|cursor| {
            let value = cursor.get();
            cursor.set(value.wrapping_add(1));
            value
        });
        let selected = array.backend_at(index % array.total_weight()).clone();

        self.shared.metrics.record_selection(STRATEGY_NAME);
        tracing::debug!(
            url = %selected.url(),
            weight = selected.weight(),
            healthy_count = array.backends().len(),
            "Selected backend"
        );

        Ok(Some(selected))
    }

    /// Cancel the background refresh task, granting pending work a bounded
    /// grace period before aborting it.
    pub async fn shutdown(&self) {
        self.shutdown.trigger();
        let handle = self
            .refresh_task
            .lock()
            .expect("refresh task mutex poisoned")
            .take();
        if let Some(handle) = handle {
            await_with_grace(handle, SHUTDOWN_GRACE).await;
        }
    }
}

impl Shared {
    /// Re-weight a healthy sequence through the updater.
    fn update_weights(&self, backends: Vec<Backend>) -> Result<Vec<Backend>, SelectionError> {
        backends
            .into_iter()
            .map(|backend| {
                let weight = self.weight_updater.update_weight(&backend);
                backend
                    .with_weight(weight)
                    .map_err(|_| SelectionError::InvalidWeight {
                        url: backend.url().clone(),
                    })
            })
            .collect()
    }

    /// Periodic refresh: re-weight the currently cached sequence and swap
    /// in a rebuilt array, independent of selection calls.
    fn refresh_weights(&self) {
        let current = self.weighted_array.load();
        match self.update_weights(current.backends().to_vec()) {
            Ok(updated) => {
                self.weighted_array
                    .store(Arc::new(WeightedBackendArray::new(updated)));
            }
            Err(err) => {
                tracing::error!(error = %err, "Background weight refresh failed, keeping previous array");
            }
        }
    }
}

impl LoadBalancingStrategy for WeightedRoundRobin {
    fn name(&self) -> &'static str {
        STRATEGY_NAME
    }

    fn select_backend(
        &self,
        backends: Option<BackendSnapshot>,
    ) -> BoxFuture<'_, Result<Option<Backend>, SelectionError>> {
        Box::pin(self.select(backends))
    }
}

//! Load balancing strategies.
//!
//! # Data Flow
//! ```text
//! caller supplies snapshot future (current backend pool)
//!     → filter to healthy backends
//!     → weight.rs (recompute each survivor's weight)
//!     → weighted_array.rs (rebuild cumulative array only on change)
//!     → proportional pick via per-thread cursor
//!     → Backend, or empty when degraded
//! ```
//!
//! # Design Decisions
//! - Strategies are trait objects; the snapshot argument is a boxed future
//!   so the trait stays object-safe
//! - Degraded conditions (empty pool, all unhealthy, fetch failure) resolve
//!   to an empty result plus a counted event, never an error
//! - Internal invariant violations surface as errors instead of being
//!   swallowed; they indicate a sequencing bug, not an operating condition

use futures_util::future::BoxFuture;
use thiserror::Error;
use url::Url;

use crate::backend::Backend;

pub mod registry;
pub mod weight;
pub(crate) mod weighted_array;
pub mod weighted_round_robin;

pub use registry::{build_weight_updater, RegistryError, WEIGHTED_ROUND_ROBIN_WITH_DECAY};
pub use weight::{DecayWeightUpdater, UpdaterError, WeightUpdater};
pub use weighted_round_robin::WeightedRoundRobin;

/// Error produced by a backend snapshot source; opaque to the core.
pub type SnapshotError = Box<dyn std::error::Error + Send + Sync>;

/// Asynchronous snapshot of the current backend pool.
///
/// The core never mutates the pool's source of truth; it only derives
/// filtered and re-weighted local copies of whatever the future resolves to.
pub type BackendSnapshot = BoxFuture<'static, Result<Vec<Backend>, SnapshotError>>;

/// Errors surfaced to selection callers.
///
/// Degraded operating conditions are deliberately not represented here;
/// they resolve to an empty selection instead.
#[derive(Debug, Error)]
pub enum SelectionError {
    /// The snapshot source argument was absent. Signals caller misuse, not
    /// a transient condition.
    #[error("backend snapshot source must be provided")]
    MissingSnapshotSource,

    /// A weight updater violated its positivity contract.
    #[error("weight updater produced a zero weight for {url}")]
    InvalidWeight {
        /// Backend the updater was evaluating.
        url: Url,
    },

    /// Selection reached a zero-total-weight array although healthy
    /// backends were believed present. Filter/rebuild sequencing bug.
    #[error("no backends available with positive weight for selection")]
    NoPositiveWeights,
}

/// A strategy for selecting one backend out of a dynamic pool.
///
/// Implementations must be non-blocking and safe for many concurrent
/// callers.
pub trait LoadBalancingStrategy: Send + Sync {
    /// Identifier attached as the `strategy` tag on emitted events.
    fn name(&self) -> &'static str;

    /// Select one backend from an asynchronous pool snapshot.
    ///
    /// Resolves to `Ok(None)` when no healthy backend is available; errors
    /// are reserved for caller misuse and internal faults.
    fn select_backend(
        &self,
        backends: Option<BackendSnapshot>,
    ) -> BoxFuture<'_, Result<Option<Backend>, SelectionError>>;

    /// Filter a pool snapshot down to its healthy members.
    fn filter_healthy(&self, backends: &[Backend]) -> Vec<Backend> {
        backends.iter().filter(|b| b.is_healthy()).cloned().collect()
    }
}

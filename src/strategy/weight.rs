//! Backend weight computation.
//!
//! # Responsibilities
//! - Define the pluggable weight-computation capability
//! - Provide the decay-based implementation
//!
//! # Design Decisions
//! - Updaters see one backend at a time and own whatever cross-call state
//!   they need; the decay variant keeps a concurrent map keyed by backend
//!   address, so callers never hold a lock
//! - Weight decays in whole-interval steps: piecewise-constant between
//!   intervals, floored at 1, capped at the configured maximum

use std::cmp;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use thiserror::Error;
use url::Url;

use crate::backend::Backend;

/// Capability for computing a backend's current weight.
///
/// Invoked from many selection calls at once; implementations must be safe
/// for concurrent use and must return a weight of at least 1.
pub trait WeightUpdater: Send + Sync {
    /// Compute the updated weight for `backend`.
    fn update_weight(&self, backend: &Backend) -> u64;

    /// Whether the balancer should schedule periodic background
    /// recomputation in addition to on-demand updates.
    fn requires_periodic_refresh(&self) -> bool {
        false
    }
}

/// Construction errors for weight updaters.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum UpdaterError {
    /// Maximum weight must be at least 1.
    #[error("max weight must be positive")]
    NonPositiveMaxWeight,

    /// Decay interval must be a positive duration.
    #[error("decay interval must be a positive duration")]
    ZeroDecayInterval,
}

/// Weight updater that decays a backend's weight by whole intervals of
/// elapsed time since its previous evaluation.
///
/// A backend evaluated again within one `decay_interval` keeps `max_weight`;
/// every further elapsed interval subtracts one, flooring at 1. A backend
/// never seen before is treated as maximally elapsed. Evaluating a backend
/// records the current time as a side effect.
#[derive(Debug)]
pub struct DecayWeightUpdater {
    max_weight: u64,
    decay_interval: Duration,
    /// Last evaluation time, keyed by backend address.
    last_used: DashMap<Url, Instant>,
}

impl DecayWeightUpdater {
    /// Create the updater. Fails for a zero maximum weight or a zero decay
    /// interval.
    pub fn new(max_weight: u64, decay_interval: Duration) -> Result<Self, UpdaterError> {
        if max_weight == 0 {
            return Err(UpdaterError::NonPositiveMaxWeight);
        }
        if decay_interval.is_zero() {
            return Err(UpdaterError::ZeroDecayInterval);
        }
        Ok(Self {
            max_weight,
            decay_interval,
            last_used: DashMap::new(),
        })
    }

    /// Weight for a backend whose previous evaluation was `elapsed` ago;
    /// `None` means it was never evaluated.
    fn decayed_weight(&self, elapsed: Option<Duration>) -> u64 {
        let decay_factor = match elapsed {
            Some(elapsed) => {
                let intervals = elapsed.as_millis() / self.decay_interval.as_millis();
                cmp::min(u128::from(self.max_weight), intervals) as u64
            }
            // Never evaluated: maximal elapsed time, full decay.
            None => self.max_weight,
        };
        cmp::max(1, self.max_weight - decay_factor)
    }
}

impl WeightUpdater for DecayWeightUpdater {
    fn update_weight(&self, backend: &Backend) -> u64 {
        let now = Instant::now();
        // insert returns the previous entry, giving one atomic read+update.
        let elapsed = self
            .last_used
            .insert(backend.url().clone(), now)
            .map(|last| now.duration_since(last));
        self.decayed_weight(elapsed)
    }
}

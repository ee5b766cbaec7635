//! Weight-updater registry.
//!
//! Maps configured algorithm names to concrete [`WeightUpdater`] variants.
//! Adding a variant means adding an arm to the match; there is no runtime
//! type dispatch beyond this single point.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

use crate::config::WeightUpdaterConfig;
use crate::strategy::weight::{DecayWeightUpdater, UpdaterError, WeightUpdater};

/// Algorithm name of the decay-based weighted round-robin updater.
pub const WEIGHTED_ROUND_ROBIN_WITH_DECAY: &str = "weighted-round-robin-with-decay";

/// Errors raised while resolving an algorithm name to an updater.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// The configured algorithm name matches no registered variant.
    #[error("unsupported weight updater algorithm: {0:?}")]
    UnknownAlgorithm(String),

    /// The variant rejected its parameters.
    #[error(transparent)]
    Updater(#[from] UpdaterError),
}

/// Whether an algorithm name resolves to a registered variant.
pub fn is_registered(algorithm: &str) -> bool {
    matches!(
        algorithm.to_lowercase().as_str(),
        WEIGHTED_ROUND_ROBIN_WITH_DECAY
    )
}

/// Build the weight updater named by the configuration.
pub fn build_weight_updater(
    config: &WeightUpdaterConfig,
) -> Result<Arc<dyn WeightUpdater>, RegistryError> {
    match config.algorithm.to_lowercase().as_str() {
        WEIGHTED_ROUND_ROBIN_WITH_DECAY => Ok(Arc::new(DecayWeightUpdater::new(
            config.max_weight,
            Duration::from_secs(config.decay_interval_secs),
        )?)),
        other => Err(RegistryError::UnknownAlgorithm(other.to_string())),
    }
}

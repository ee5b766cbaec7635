//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check the algorithm name against the strategy registry
//! - Validate value ranges (weights and intervals positive, address parses)
//!
//! # Design Decisions
//! - Returns all validation errors, not just the first
//! - Validation is a pure function: BalancerConfig → Result<(), Vec<ValidationError>>
//! - Runs before any component is constructed

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::BalancerConfig;
use crate::strategy::registry;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// A single semantic violation in a configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// Algorithm name is blank.
    #[error("weight updater algorithm must not be empty")]
    EmptyAlgorithm,

    /// Algorithm name matches no registered variant.
    #[error("unknown weight updater algorithm: {0:?}")]
    UnknownAlgorithm(String),

    /// `max_weight` must be at least 1.
    #[error("max_weight must be positive")]
    NonPositiveMaxWeight,

    /// `decay_interval_secs` must be at least 1.
    #[error("decay_interval_secs must be positive")]
    NonPositiveDecayInterval,

    /// Refresh `period_secs` must be at least 1.
    #[error("refresh period_secs must be positive")]
    NonPositivePeriod,

    /// Log level is not one of trace/debug/info/warn/error.
    #[error("invalid log level: {0:?}")]
    InvalidLogLevel(String),

    /// Metrics address does not parse as a socket address.
    #[error("invalid metrics address: {0:?}")]
    InvalidMetricsAddress(String),
}

/// Validate a configuration, collecting every violation.
pub fn validate_config(config: &BalancerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let updater = &config.weight_updater;
    if updater.algorithm.trim().is_empty() {
        errors.push(ValidationError::EmptyAlgorithm);
    } else if !registry::is_registered(&updater.algorithm) {
        errors.push(ValidationError::UnknownAlgorithm(updater.algorithm.clone()));
    }
    if updater.max_weight == 0 {
        errors.push(ValidationError::NonPositiveMaxWeight);
    }
    if updater.decay_interval_secs == 0 {
        errors.push(ValidationError::NonPositiveDecayInterval);
    }

    if config.refresh.period_secs == 0 {
        errors.push(ValidationError::NonPositivePeriod);
    }

    let observability = &config.observability;
    if !LOG_LEVELS.contains(&observability.log_level.as_str()) {
        errors.push(ValidationError::InvalidLogLevel(
            observability.log_level.clone(),
        ));
    }
    if observability.metrics_enabled
        && observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidMetricsAddress(
            observability.metrics_address.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

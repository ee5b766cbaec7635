//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the
//! balancer core. All types derive Serde traits for deserialization from
//! config files.

use serde::{Deserialize, Serialize};

use crate::strategy::registry::WEIGHTED_ROUND_ROBIN_WITH_DECAY;

/// Root configuration for the balancer core.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct BalancerConfig {
    /// Weight updater selection and parameters.
    pub weight_updater: WeightUpdaterConfig,

    /// Background weight refresh scheduling.
    pub refresh: RefreshConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Weight updater configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct WeightUpdaterConfig {
    /// Algorithm identifier, resolved through the strategy registry.
    pub algorithm: String,

    /// Maximum weight a backend can have.
    pub max_weight: u64,

    /// Whole-interval step after which weight decays, in seconds.
    pub decay_interval_secs: u64,
}

impl Default for WeightUpdaterConfig {
    fn default() -> Self {
        Self {
            algorithm: WEIGHTED_ROUND_ROBIN_WITH_DECAY.to_string(),
            max_weight: 100,
            decay_interval_secs: 5,
        }
    }
}

/// Background refresh scheduling for updaters that require it.
#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
#[serde(default)]
pub struct RefreshConfig {
    /// Delay before the first refresh, in seconds.
    pub initial_delay_secs: u64,

    /// Interval between refreshes, in seconds.
    pub period_secs: u64,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            initial_delay_secs: 0,
            period_secs: 5,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable the metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: true,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config: BalancerConfig = toml::from_str("").unwrap();

        assert_eq!(
            config.weight_updater.algorithm,
            WEIGHTED_ROUND_ROBIN_WITH_DECAY
        );
        assert_eq!(config.weight_updater.max_weight, 100);
        assert_eq!(config.weight_updater.decay_interval_secs, 5);
        assert_eq!(config.refresh.initial_delay_secs, 0);
        assert_eq!(config.refresh.period_secs, 5);
        assert_eq!(config.observability.log_level, "info");
    }

    #[test]
    fn test_partial_sections_override_defaults() {
        let config: BalancerConfig = toml::from_str(
            r#"
            [weight_updater]
            max_weight = 50

            [refresh]
            period_secs = 30
            "#,
        )
        .unwrap();

        assert_eq!(config.weight_updater.max_weight, 50);
        // untouched fields keep their defaults
        assert_eq!(config.weight_updater.decay_interval_secs, 5);
        assert_eq!(config.refresh.period_secs, 30);
        assert!(config.observability.metrics_enabled);
    }
}

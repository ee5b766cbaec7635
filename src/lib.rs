//! Weighted backend selection core.
//!
//! Selects one backend out of a dynamically changing, weighted pool so that
//! selection frequency converges to each backend's relative weight, weights
//! evolve with usage recency, and selection stays wait-free under concurrent
//! callers. Traffic forwarding, health probing, and service discovery are
//! external collaborators reached through the narrow interfaces in
//! [`strategy`] and [`observability`].
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use balancer_core::config::BalancerConfig;
//! use balancer_core::observability::metrics::MetricsFacade;
//! use balancer_core::strategy::{BackendSnapshot, WeightedRoundRobin};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = BalancerConfig::default();
//! let strategy = WeightedRoundRobin::from_config(&config, Arc::new(MetricsFacade))?;
//!
//! // The pool snapshot usually comes from a service registry client.
//! let snapshot: BackendSnapshot = Box::pin(async { Ok(Vec::new()) });
//! let selected = strategy.select(Some(snapshot)).await?;
//! assert!(selected.is_none());
//! # Ok(())
//! # }
//! ```

pub mod backend;
pub mod config;
pub mod lifecycle;
pub mod observability;
pub mod strategy;

pub use backend::{Backend, BackendError};
pub use config::BalancerConfig;
pub use observability::metrics::StrategyMetrics;
pub use strategy::{
    BackendSnapshot, LoadBalancingStrategy, SelectionError, SnapshotError, WeightedRoundRobin,
};

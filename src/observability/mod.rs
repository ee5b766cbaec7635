//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Strategy code produces:
//!     → logging.rs (structured log events via tracing)
//!     → metrics.rs (selection counters, latency histogram)
//!
//! Consumers:
//!     → Log aggregation (stdout, file, remote)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - The core emits through the `StrategyMetrics` trait; which recorder
//!   receives the events is decided by the embedding process
//! - Metric updates are cheap (atomic increments inside the recorder)
//! - Every event carries a `strategy` tag so multiple strategies can share
//!   one recorder

pub mod logging;
pub mod metrics;

pub use metrics::{MetricsFacade, StrategyMetrics};

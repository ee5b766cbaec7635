//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Shutdown (shutdown.rs):
//!     trigger() → broadcast to subscribed background tasks
//!     → each task exits its loop
//!     → await_with_grace() waits out the grace period, then aborts
//! ```
//!
//! # Design Decisions
//! - One broadcast channel fans out to every background task
//! - Shutdown has a timeout: tasks still running after the grace period
//!   are aborted rather than awaited forever

pub mod shutdown;

pub use shutdown::{await_with_grace, Shutdown};

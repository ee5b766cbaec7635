//! Shutdown coordination for background tasks.

use std::time::Duration;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;

/// Coordinator for graceful shutdown.
///
/// Provides a broadcast channel that all long-running tasks can subscribe to.
pub struct Shutdown {
    /// Broadcast channel sender.
    tx: broadcast::Sender<()>,
}

impl Shutdown {
    /// Create a new shutdown coordinator.
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self { tx }
    }

    /// Subscribe to the shutdown signal.
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }

    /// Trigger the shutdown signal.
    pub fn trigger(&self) {
        let _ = self.tx.send(());
    }

    /// Get the number of active subscribers (tasks still running).
    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

/// Wait for a signalled task to finish, aborting it once the grace period
/// runs out.
pub async fn await_with_grace(mut handle: JoinHandle<()>, grace: Duration) {
    match tokio::time::timeout(grace, &mut handle).await {
        Ok(Err(err)) if err.is_panic() => {
            tracing::error!(error = %err, "Background task panicked during shutdown");
        }
        Ok(_) => {}
        Err(_) => {
            tracing::warn!(
                grace_ms = grace.as_millis() as u64,
                "Background task exceeded shutdown grace period, aborting"
            );
            handle.abort();
            let _ = handle.await;
        }
    }
}

//! Background tree integrity monitor.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::node::Node;

/// Validate the tree every `interval` until shutdown is signalled.
///
/// Failures are reported by [`Node::validate_tree`] itself (error log and
/// integrity counter); the monitor keeps running after one.
pub fn spawn_integrity_monitor(
    node: Arc<Node>,
    interval: Duration,
    mut shutdown: broadcast::Receiver<()>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately.
        ticker.tick().await;
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let node = Arc::clone(&node);
                    match tokio::task::spawn_blocking(move || node.validate_tree()).await {
                        Ok(true) => tracing::debug!("tree integrity check passed"),
                        Ok(false) => {}
                        Err(e) => tracing::error!(error = %e, "integrity check task failed"),
                    }
                }
                _ = shutdown.recv() => {
                    tracing::info!("integrity monitor stopping");
                    break;
                }
            }
        }
    })
}

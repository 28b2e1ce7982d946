//! The autofind loop — background discovery on a poll interval.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;

use crate::discovery::DiscoveryEngine;

/// Handle to the background discovery loop.
///
/// The loop runs one pass, sleeps the poll interval, and repeats until
/// stopped. [`stop`](Self::stop) waits for an in-flight pass to finish
/// before returning, so no registry mutation can be observed after
/// shutdown completes.
pub struct Autofind {
    shutdown: watch::Sender<bool>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl Autofind {
    /// Spawn the loop on the current tokio runtime.
    ///
    /// The first pass starts immediately; subsequent passes are separated
    /// by `interval`.
    #[must_use]
    pub fn spawn(engine: Arc<DiscoveryEngine>, interval: Duration) -> Self {
        let (shutdown, mut signal) = watch::channel(false);
        let task = tokio::spawn(async move {
            tracing::info!(interval_secs = interval.as_secs(), "autofind started");
            loop {
                let report = engine.run_pass().await;
                tracing::debug!(elapsed_ms = report.elapsed_ms, "autofind pass finished");
                tokio::select! {
                    () = tokio::time::sleep(interval) => {}
                    // A shutdown requested mid-pass is seen here, after
                    // the pass completed.
                    _ = signal.changed() => break,
                }
            }
            tracing::info!("autofind stopped");
        });
        Self {
            shutdown,
            task: Mutex::new(Some(task)),
        }
    }

    /// Stop the loop, waiting for any in-flight pass to finish.
    ///
    /// Idempotent; later calls return immediately.
    pub async fn stop(&self) {
        let _ = self.shutdown.send(true);
        if let Some(task) = self.task.lock().await.take() {
            if let Err(err) = task.await {
                tracing::error!(error = %err, "autofind task failed");
            }
        }
    }
}

//! Periodic background rebuild of the customer index.

use crate::error::SearchError;
use crate::services::rebuild_service::IndexRebuilder;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

/// Default time between scheduled rebuilds.
pub const DEFAULT_REBUILD_INTERVAL: Duration = Duration::from_secs(10);

const MIN_REBUILD_INTERVAL: Duration = Duration::from_millis(1);

/// Handle to a running background rebuild task.
///
/// Rebuilds run one after another inside a single task, so a slow rebuild
/// never overlaps the next one; ticks missed meanwhile are skipped. A failed
/// cycle is logged and the schedule continues. Dropping the handle without
/// calling [`stop`](Self::stop) also ends the task after its current cycle.
pub struct RebuildScheduler {
    stop_tx: watch::Sender<bool>,
    handle: JoinHandle<()>,
    interval: Duration,
}

impl RebuildScheduler {
    /// Spawn the rebuild loop on the current tokio runtime. The first
    /// rebuild starts immediately.
    pub fn start(rebuilder: Arc<IndexRebuilder>, interval: Duration) -> Self {
        let interval = interval.max(MIN_REBUILD_INTERVAL);
        let (stop_tx, stop_rx) = watch::channel(false);
        let handle = tokio::spawn(run(rebuilder, interval, stop_rx));

        Self {
            stop_tx,
            handle,
            interval,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn is_running(&self) -> bool {
        !self.handle.is_finished()
    }

    /// Signal the loop to stop and wait for it to exit.
    ///
    /// A pending interval wait is abandoned at once; a rebuild already in
    /// progress finishes first.
    pub async fn stop(self) {
        let _ = self.stop_tx.send(true);
        if let Err(e) = self.handle.await {
            error!(error = %e, "Background rebuild task ended abnormally");
        }
    }
}

async fn run(rebuilder: Arc<IndexRebuilder>, interval: Duration, mut stop_rx: watch::Receiver<bool>) {
    info!(
        interval_ms = interval.as_millis(),
        "Starting background customer index rebuild"
    );

    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            biased;
            // Also fires when the sender is dropped.
            _ = stop_rx.changed() => break,
            _ = ticker.tick() => {}
        }

        match rebuilder.rebuild().await {
            Ok(report) => debug!(
                generation = %report.generation,
                documents = report.documents,
                "Scheduled rebuild finished"
            ),
            Err(SearchError::WriterBusy) => {
                warn!("Index writer busy, skipping this rebuild cycle")
            }
            Err(e) => error!(
                error = %e,
                "An error occurred when trying to rebuild the search index for customers"
            ),
        }
    }

    info!("Stopping background customer index rebuild");
}

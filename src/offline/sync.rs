//! Background synchronization of the offline queue.
//!
//! [`Synchronizer`] performs one sync cycle; [`SyncWorker`] drives it from a
//! tokio task on a fixed interval until it is told to stop.

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDateTime;
use serde::Serialize;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

use crate::clock::Clock;
use crate::error::EngineResult;
use crate::models::OfflineQueueEntry;

use super::notifier::Notifier;
use super::queue::OfflineQueue;

/// Replays one queued punch against the primary store.
pub trait SyncHandler: Send + Sync {
    /// Returns `Err` with a description when the entry could not be synchronized.
    fn sync(&self, entry: &OfflineQueueEntry) -> Result<(), String>;
}

/// What one sync cycle did.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CycleReport {
    /// Entries handed to the handler.
    pub attempted: usize,
    /// Entries synchronized and removed.
    pub synced: usize,
    /// Entries whose sync failed.
    pub failed: usize,
    /// Expired entries purged in this cycle.
    pub purged: usize,
    /// True if an operator alert was sent.
    pub alert_sent: bool,
}

/// Runs sync cycles over the offline queue.
///
/// Alerts are rate limited: at most one per `alert_cooldown_seconds`, and only
/// for cycles with more than `failure_alert_threshold` failures. Expired
/// entries are purged at most once per `purge_interval_seconds`.
pub struct Synchronizer {
    queue: Arc<OfflineQueue>,
    handler: Arc<dyn SyncHandler>,
    notifier: Arc<dyn Notifier>,
    clock: Arc<dyn Clock>,
    last_alert_at: Option<NaiveDateTime>,
    last_purge_at: Option<NaiveDateTime>,
}

impl Synchronizer {
    /// Creates a synchronizer over `queue`.
    pub fn new(
        queue: Arc<OfflineQueue>,
        handler: Arc<dyn SyncHandler>,
        notifier: Arc<dyn Notifier>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            queue,
            handler,
            notifier,
            clock,
            last_alert_at: None,
            last_purge_at: None,
        }
    }

    /// Time the last alert was sent, if any.
    pub fn last_alert_at(&self) -> Option<NaiveDateTime> {
        self.last_alert_at
    }

    /// Performs one cycle: sync a batch, alert if needed, purge if due.
    pub fn run_once(&mut self) -> EngineResult<CycleReport> {
        let config = self.queue.config().clone();
        let mut report = CycleReport::default();
        let mut last_error = None;

        for entry in self.queue.pending(config.batch_size)? {
            report.attempted += 1;
            match self.handler.sync(&entry) {
                Ok(()) => {
                    self.queue.mark_synced(entry.id)?;
                    report.synced += 1;
                    debug!(entry_id = entry.id, punch_type = %entry.punch_type, "Offline entry synced");
                }
                Err(message) => {
                    warn!(
                        entry_id = entry.id,
                        retry_count = entry.retry_count + 1,
                        error = %message,
                        "Offline entry sync failed"
                    );
                    self.queue.record_failure(entry.id, &message)?;
                    report.failed += 1;
                    last_error = Some(message);
                }
            }
        }

        let now = self.clock.now();
        if report.failed > config.failure_alert_threshold && self.alert_allowed(now) {
            let message = format!(
                "Offline punch sync: {} of {} entries failed in one cycle (last error: {})",
                report.failed,
                report.attempted,
                last_error.as_deref().unwrap_or("unknown"),
            );
            self.notifier.send(&config.alert_channel, &message);
            self.last_alert_at = Some(now);
            report.alert_sent = true;
        }

        let purge_due = self
            .last_purge_at
            .is_none_or(|last| now - last >= config.purge_interval());
        if purge_due {
            report.purged = self.queue.purge_expired()?;
            self.last_purge_at = Some(now);
        }

        if report.attempted > 0 || report.purged > 0 {
            info!(
                attempted = report.attempted,
                synced = report.synced,
                failed = report.failed,
                purged = report.purged,
                "Sync cycle complete"
            );
        }
        Ok(report)
    }

    fn alert_allowed(&self, now: NaiveDateTime) -> bool {
        self.last_alert_at
            .is_none_or(|last| now - last >= self.queue.config().alert_cooldown())
    }
}

/// Handle to the background sync task.
pub struct SyncWorker {
    stop_tx: watch::Sender<bool>,
    handle: JoinHandle<()>,
    shutdown_timeout: Duration,
}

impl SyncWorker {
    /// Spawns the sync loop using the queue's configured interval and timeout.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn(synchronizer: Synchronizer) -> Self {
        let config = synchronizer.queue.config();
        let interval = config.sync_interval();
        let shutdown_timeout = config.shutdown_timeout();
        Self::spawn_with(synchronizer, interval, shutdown_timeout)
    }

    /// Spawns the sync loop with an explicit interval and shutdown timeout.
    pub fn spawn_with(
        synchronizer: Synchronizer,
        interval: Duration,
        shutdown_timeout: Duration,
    ) -> Self {
        let (stop_tx, stop_rx) = watch::channel(false);
        let handle = tokio::spawn(run_loop(synchronizer, interval, stop_rx));
        info!(interval_secs = interval.as_secs(), "Sync worker started");
        Self {
            stop_tx,
            handle,
            shutdown_timeout,
        }
    }

    /// Returns true once the loop has exited.
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Signals the loop to stop and waits for it, up to the shutdown timeout.
    ///
    /// Returns true if the task stopped in time. A cycle in progress is
    /// allowed to finish; a timeout is logged and otherwise ignored.
    pub async fn shutdown(self) -> bool {
        if self.stop_tx.send(true).is_err() {
            debug!("Sync worker already stopped");
        }

        match tokio::time::timeout(self.shutdown_timeout, self.handle).await {
            Ok(Ok(())) => {
                info!("Sync worker stopped");
                true
            }
            Ok(Err(e)) => {
                error!(error = %e, "Sync worker task failed");
                false
            }
            Err(_) => {
                warn!(
                    timeout_secs = self.shutdown_timeout.as_secs(),
                    "Sync worker did not stop within the shutdown timeout"
                );
                false
            }
        }
    }
}

async fn run_loop(
    synchronizer: Synchronizer,
    interval: Duration,
    mut stop_rx: watch::Receiver<bool>,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut synchronizer = Some(synchronizer);

    loop {
        tokio::select! {
            biased;
            changed = stop_rx.changed() => {
                if changed.is_err() || *stop_rx.borrow() {
                    break;
                }
                continue;
            }
            _ = ticker.tick() => {}
        }

        let Some(mut current) = synchronizer.take() else {
            break;
        };
        let cycle = tokio::task::spawn_blocking(move || {
            let result = current.run_once();
            (current, result)
        })
        .await;

        match cycle {
            Ok((current, result)) => {
                if let Err(e) = result {
                    error!(error = %e, code = %e.code(), "Sync cycle failed");
                }
                synchronizer = Some(current);
            }
            Err(e) => {
                error!(error = %e, "Sync cycle panicked, stopping worker");
                break;
            }
        }
    }

    debug!("Sync loop exited");
}

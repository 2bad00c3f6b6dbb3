//! Reconcile scheduler - runs a delayed, cancellable reconciliation fetch
//!
//! After an optimistic insert the engine hands a reconciliation job to the
//! [`ReconcileScheduler`], which spawns it on the Tokio runtime behind a
//! fixed delay. The caller gets a [`ReconcileHandle`] back and may ignore it,
//! cancel the job before it starts, or await its outcome.
//!
//! ```text
//! create_thread ──→ schedule(job) ──→ sleep(delay) ──→ job (fetch + replace_all)
//!                        │                 │
//!                  ReconcileHandle ── cancel() aborts the wait
//! ```

use std::future::Future;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// What happened to a scheduled reconciliation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// The fetch succeeded and the snapshot now holds `threads` threads
    Reconciled {
        /// Size of the new snapshot
        threads: usize,
    },
    /// The fetch failed; the optimistic thread stays until the next fetch
    Failed,
    /// The job was cancelled before it ran
    Cancelled,
}

/// Spawns reconciliation jobs after a fixed delay
#[derive(Debug, Clone)]
pub struct ReconcileScheduler {
    delay: Duration,
}

impl ReconcileScheduler {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    /// Delay applied before every job
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Spawns `job` to run once `delay` has elapsed.
    ///
    /// `job` is not polled until the delay is over. Cancelling the returned
    /// handle during the wait drops it unpolled; once it has started it runs
    /// to completion.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn schedule<F>(&self, job: F) -> ReconcileHandle
    where
        F: Future<Output = anyhow::Result<usize>> + Send + 'static,
    {
        let token = CancellationToken::new();
        let child = token.clone();
        let delay = self.delay;

        debug!(delay_ms = delay.as_millis() as u64, "Scheduling reconciliation");

        let task = tokio::spawn(async move {
            tokio::select! {
                _ = child.cancelled() => {
                    debug!("Reconciliation cancelled before it started");
                    return ReconcileOutcome::Cancelled;
                }
                _ = tokio::time::sleep(delay) => {}
            }

            match job.await {
                Ok(threads) => {
                    info!(threads, "Reconciliation complete");
                    ReconcileOutcome::Reconciled { threads }
                }
                Err(err) => {
                    warn!(error = %err, "Reconciliation fetch failed; keeping optimistic state");
                    ReconcileOutcome::Failed
                }
            }
        });

        ReconcileHandle { token, task }
    }
}

/// Handle to a scheduled reconciliation
///
/// Dropping the handle detaches the job; it still runs.
#[derive(Debug)]
pub struct ReconcileHandle {
    token: CancellationToken,
    task: JoinHandle<ReconcileOutcome>,
}

impl ReconcileHandle {
    /// Cancels the job if it has not started yet
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Waits for the job and returns its outcome
    pub async fn wait(self) -> ReconcileOutcome {
        match self.task.await {
            Ok(outcome) => outcome,
            Err(err) => {
                warn!(error = %err, "Reconciliation task did not complete");
                ReconcileOutcome::Failed
            }
        }
    }
}

//! Bounded background queue for memory commits.
//!
//! Commits run off the response path. A single worker drains a bounded
//! channel; submission never blocks and drops the job when the queue is
//! full. [`CommitQueue::shutdown`] stops intake and drains what was queued.

use crate::agents::CommitterAgent;
use crate::metrics::SwarmMetrics;
use parking_lot::Mutex;
use quill_core::SceneSpec;
use quill_error::{SwarmError, SwarmErrorKind, SwarmResult};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Default number of commits that may wait in the queue.
pub const DEFAULT_COMMIT_QUEUE_CAPACITY: usize = 64;

/// One finished scene waiting to be committed.
#[derive(Debug, Clone, PartialEq)]
pub struct CommitJob {
    /// Scene identifier
    pub scene_id: String,
    /// Chapter number
    pub chapter: i64,
    /// Scene number
    pub scene: i64,
    /// Final prose
    pub text: String,
    /// Director design
    pub scene_spec: SceneSpec,
}

/// Handle to the commit worker.
pub struct CommitQueue {
    tx: mpsc::Sender<CommitJob>,
    shutdown: watch::Sender<bool>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl CommitQueue {
    /// Spawn the worker. Must be called inside a tokio runtime.
    pub fn start(committer: CommitterAgent, capacity: usize) -> Self {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        let (shutdown, shutdown_rx) = watch::channel(false);
        let worker = tokio::spawn(run_worker(Arc::new(committer), rx, shutdown_rx));
        debug!(capacity, "Commit queue started");

        Self {
            tx,
            shutdown,
            worker: Mutex::new(Some(worker)),
        }
    }

    /// Queue a commit without waiting.
    ///
    /// # Errors
    ///
    /// Returns `CommitFailed` when the queue is full or shut down. The job is
    /// dropped in both cases.
    pub fn submit(&self, job: CommitJob) -> SwarmResult<()> {
        match self.tx.try_send(job) {
            Ok(()) => {
                SwarmMetrics::get().record_commit("queued");
                Ok(())
            }
            Err(mpsc::error::TrySendError::Full(job)) => {
                SwarmMetrics::get().record_commit("dropped");
                warn!(scene_id = %job.scene_id, "Commit queue full, dropping commit");
                Err(SwarmError::new(SwarmErrorKind::CommitFailed(format!(
                    "commit queue full, dropped scene {}",
                    job.scene_id
                ))))
            }
            Err(mpsc::error::TrySendError::Closed(job)) => {
                SwarmMetrics::get().record_commit("dropped");
                warn!(scene_id = %job.scene_id, "Commit queue closed, dropping commit");
                Err(SwarmError::new(SwarmErrorKind::CommitFailed(format!(
                    "commit queue closed, dropped scene {}",
                    job.scene_id
                ))))
            }
        }
    }

    /// Stop intake, drain queued commits and wait for the worker.
    ///
    /// Returns `false` if the worker did not finish within `timeout`, in
    /// which case it is aborted and remaining commits are lost. Calling this
    /// more than once is harmless.
    pub async fn shutdown(&self, timeout: Duration) -> bool {
        // The worker may already be gone; nothing to signal then.
        let _ = self.shutdown.send(true);

        let handle = self.worker.lock().take();
        let Some(mut handle) = handle else {
            return true;
        };

        match tokio::time::timeout(timeout, &mut handle).await {
            Ok(Ok(())) => {
                info!("Commit queue drained");
                true
            }
            Ok(Err(e)) => {
                error!(error = %e, "Commit worker ended abnormally");
                false
            }
            Err(_) => {
                handle.abort();
                warn!(timeout_ms = timeout.as_millis() as u64, "Commit queue drain timed out, aborting worker");
                false
            }
        }
    }
}

async fn run_worker(
    committer: Arc<CommitterAgent>,
    mut rx: mpsc::Receiver<CommitJob>,
    mut shutdown: watch::Receiver<bool>,
) {
    loop {
        tokio::select! {
            job = rx.recv() => match job {
                Some(job) => process(&committer, job).await,
                None => break,
            },
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    break;
                }
            }
        }
    }

    rx.close();
    let mut drained = 0usize;
    while let Some(job) = rx.recv().await {
        process(&committer, job).await;
        drained += 1;
    }
    debug!(drained, "Commit worker stopped");
}

async fn process(committer: &CommitterAgent, job: CommitJob) {
    let scene_id = job.scene_id.clone();
    match committer.commit(job).await {
        Ok(()) => SwarmMetrics::get().record_commit("committed"),
        Err(e) => {
            SwarmMetrics::get().record_commit("failed");
            error!(scene_id = %scene_id, error = %e, "Memory commit failed");
        }
    }
}

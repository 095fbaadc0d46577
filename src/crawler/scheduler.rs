//! Worker pool and task submission
//!
//! This module handles:
//! - The unbounded task queue that absorbs bursts of discovered links
//! - Counting each unit with the quiescence tracker before it is queued
//! - A fixed number of worker slots that run crawl steps
//! - Shutting the pool down once the crawl is quiescent
//!
//! Submission never blocks. A crawl step is itself running on a worker, so a
//! bounded queue could deadlock the pool on its own fan-out.

use crate::crawler::step::{crawl_step, CrawlContext};
use crate::state::{QuiescenceTracker, TaskUnit, UnitGuard};
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Receiving end of the task queue, shared by every worker
pub type TaskQueue = Arc<Mutex<mpsc::UnboundedReceiver<TaskUnit>>>;

/// Creates a task queue and the submitter that feeds it
///
/// # Arguments
///
/// * `tracker` - Counts every accepted submission
/// * `cancel` - Once cancelled, submissions are refused
pub fn task_queue(
    tracker: Arc<QuiescenceTracker>,
    cancel: CancellationToken,
) -> (Submitter, TaskQueue) {
    let (tx, rx) = mpsc::unbounded_channel();
    let submitter = Submitter {
        tx,
        tracker,
        cancel,
    };
    (submitter, Arc::new(Mutex::new(rx)))
}

/// Non-blocking submission interface of the worker pool
#[derive(Debug, Clone)]
pub struct Submitter {
    tx: mpsc::UnboundedSender<TaskUnit>,
    tracker: Arc<QuiescenceTracker>,
    cancel: CancellationToken,
}

impl Submitter {
    /// Counts `unit` as outstanding and queues it
    ///
    /// # Returns
    ///
    /// * `true` - The unit was queued and will be run by a worker
    /// * `false` - The crawl is cancelled or the pool is gone; nothing was counted
    pub fn submit(&self, unit: TaskUnit) -> bool {
        if self.cancel.is_cancelled() {
            tracing::trace!("Crawl cancelled, not submitting {}", unit.url());
            return false;
        }

        self.tracker.begin_unit();

        if let Err(mpsc::error::SendError(unit)) = self.tx.send(unit) {
            tracing::warn!("Worker pool closed, dropping {}", unit.url());
            self.tracker.finish_unit();
            return false;
        }

        true
    }
}

/// Fixed-size pool of workers draining the task queue
pub struct WorkerPool {
    workers: Vec<JoinHandle<()>>,
    shutdown: CancellationToken,
}

impl WorkerPool {
    /// Spawns `worker_count` workers onto the current tokio runtime
    ///
    /// Each worker takes one unit at a time and runs its crawl step to the end
    /// before taking the next, so at most `worker_count` steps run at once.
    pub fn spawn(worker_count: usize, queue: TaskQueue, ctx: Arc<CrawlContext>) -> Self {
        let shutdown = CancellationToken::new();

        let workers = (0..worker_count)
            .map(|id| {
                tokio::spawn(worker_loop(
                    id,
                    Arc::clone(&queue),
                    Arc::clone(&ctx),
                    shutdown.clone(),
                ))
            })
            .collect();

        tracing::debug!("Spawned {} crawl workers", worker_count);

        Self { workers, shutdown }
    }

    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    /// Stops every worker and waits for them to exit
    ///
    /// Only called once the crawl is quiescent, when the queue is empty and no
    /// step is running.
    pub async fn shutdown(mut self) {
        self.shutdown.cancel();
        for worker in std::mem::take(&mut self.workers) {
            if let Err(e) = worker.await {
                tracing::error!("Crawl worker exited abnormally: {}", e);
            }
        }
        tracing::debug!("Worker pool shut down");
    }
}

impl Drop for WorkerPool {
    /// Releases every worker slot when the pool is dropped without `shutdown`
    ///
    /// Workers finish the step they are running and then exit.
    fn drop(&mut self) {
        if !self.workers.is_empty() {
            tracing::debug!("Worker pool dropped, stopping {} workers", self.workers.len());
        }
        self.shutdown.cancel();
    }
}

async fn worker_loop(
    id: usize,
    queue: TaskQueue,
    ctx: Arc<CrawlContext>,
    shutdown: CancellationToken,
) {
    loop {
        let next = tokio::select! {
            biased;
            _ = shutdown.cancelled() => None,
            unit = async { queue.lock().await.recv().await } => unit,
        };

        let Some(unit) = next else {
            break;
        };

        tracing::trace!("Worker {} took {} (depth {})", id, unit.url(), unit.depth());

        // The guard travels with the step so a panic still finishes the unit.
        let guard = UnitGuard::new(ctx.tracker());
        let step_ctx = Arc::clone(&ctx);
        let step = tokio::spawn(async move {
            let _guard = guard;
            crawl_step(&step_ctx, unit).await;
        });

        if let Err(e) = step.await {
            tracing::error!("Crawl step on worker {} failed: {}", id, e);
        }
    }

    tracing::trace!("Worker {} stopped", id);
}

//! Quiescence detection for a self-replicating task graph
//!
//! The tracker counts units that were submitted but have not finished. A unit
//! is counted before it becomes visible to any worker and uncounted only after
//! its crawl step, including every child submission, has returned. A parent
//! therefore always holds the count above zero while its children are being
//! counted, and the counter reaches zero only when no unit is queued, none is
//! running and none can be produced any more.
//!
//! The zero transition is published through a `watch` channel, so waiters
//! block until it happens instead of sampling the queue.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::watch;

/// Counts outstanding task units and signals when the count reaches zero
#[derive(Debug)]
pub struct QuiescenceTracker {
    outstanding: AtomicUsize,
    quiescent: watch::Sender<bool>,
}

impl QuiescenceTracker {
    pub fn new() -> Self {
        let (quiescent, _) = watch::channel(false);
        Self {
            outstanding: AtomicUsize::new(0),
            quiescent,
        }
    }

    /// Counts a unit that is about to be submitted
    ///
    /// Must be called before the unit is handed to the worker pool.
    pub fn begin_unit(&self) {
        let previous = self.outstanding.fetch_add(1, Ordering::AcqRel);
        if previous == 0 && self.is_quiescent() {
            tracing::error!("Task unit submitted after the crawl reached quiescence");
        }
    }

    /// Uncounts a unit whose crawl step has fully returned
    ///
    /// The call that takes the counter from one to zero publishes quiescence.
    pub fn finish_unit(&self) {
        match self
            .outstanding
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_sub(1))
        {
            Ok(1) => {
                tracing::debug!("Outstanding work reached zero, crawl is quiescent");
                self.quiescent.send_replace(true);
            }
            Ok(_) => {}
            Err(_) => {
                tracing::error!("Task unit finished without a matching submission");
            }
        }
    }

    /// Number of units submitted but not yet finished
    pub fn outstanding(&self) -> usize {
        self.outstanding.load(Ordering::Acquire)
    }

    /// Returns true once the counter has transitioned to zero
    pub fn is_quiescent(&self) -> bool {
        *self.quiescent.borrow()
    }

    /// Waits until the crawl is quiescent
    ///
    /// Returns immediately if quiescence was already reached. A tracker that has
    /// never counted a unit is not quiescent, so callers must submit the seed
    /// before waiting.
    pub async fn wait(&self) {
        let mut rx = self.quiescent.subscribe();
        // The sender lives in `self`, so the channel cannot close while we wait.
        let _ = rx.wait_for(|quiescent| *quiescent).await;
    }
}

impl Default for QuiescenceTracker {
    fn default() -> Self {
        Self::new()
    }
}

/// Finishes one unit on drop
///
/// Held by a worker for the whole crawl step, so the unit is uncounted on every
/// exit path, including early returns and panics inside the step.
pub struct UnitGuard {
    tracker: Arc<QuiescenceTracker>,
}

impl UnitGuard {
    pub fn new(tracker: Arc<QuiescenceTracker>) -> Self {
        Self { tracker }
    }
}

impl Drop for UnitGuard {
    fn drop(&mut self) {
        self.tracker.finish_unit();
    }
}

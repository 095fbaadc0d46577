//! Crawler coordinator - owns one crawl run from seed to quiescence
//!
//! This module contains the orchestrator that:
//! - Owns the visited set, quiescence tracker and statistics
//! - Claims and submits the seed
//! - Waits (without polling) until no unit is queued or running
//! - Applies the optional deadline and external cancellation
//! - Shuts the worker pool down and reports statistics

use crate::config::{Config, CrawlerConfig};
use crate::crawler::fetcher::{Fetcher, HttpFetcher};
use crate::crawler::scheduler::{task_queue, TaskQueue, WorkerPool};
use crate::crawler::step::CrawlContext;
use crate::output::{CrawlCounters, CrawlStats};
use crate::state::{QuiescenceTracker, TaskUnit, VisitedSet};
use crate::url::{canonicalize, LinkFilter};
use crate::{ConfigError, CrawlError};
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;

/// Lifecycle of a crawler
enum Phase {
    /// Built, seed not yet submitted
    Ready(TaskQueue),
    /// Seed submitted, workers running
    Running { pool: WorkerPool, started_at: Instant },
    /// Quiescent and shut down
    Finished(CrawlStats),
}

/// Orchestrates one crawl run
///
/// # Example
///
/// ```no_run
/// use spider_pool::{Config, Crawler};
///
/// # async fn example() -> Result<(), spider_pool::CrawlError> {
/// let config = Config::for_seed("https://example.com/");
/// let mut crawler = Crawler::with_http(&config)?;
/// crawler.start(&config.crawler.seed_url)?;
/// let stats = crawler.await_completion().await?;
/// println!("Visited {} URLs", stats.unique_urls_visited);
/// # Ok(())
/// # }
/// ```
pub struct Crawler {
    config: CrawlerConfig,
    ctx: Arc<CrawlContext>,
    phase: Option<Phase>,
}

impl Crawler {
    /// Creates a crawler that fetches pages through `fetcher`
    ///
    /// # Arguments
    ///
    /// * `config` - The crawl configuration
    /// * `fetcher` - The fetch-and-extract capability used by every crawl step
    pub fn new(config: &Config, fetcher: Arc<dyn Fetcher>) -> Self {
        let tracker = Arc::new(QuiescenceTracker::new());
        let cancel = CancellationToken::new();
        let (submitter, queue) = task_queue(Arc::clone(&tracker), cancel.clone());

        let ctx = CrawlContext {
            visited: Arc::new(VisitedSet::new()),
            tracker,
            counters: Arc::new(CrawlCounters::new()),
            submitter,
            fetcher,
            filter: LinkFilter::new(&config.filter),
            cancel,
            cancel_policy: config.crawler.cancel_policy,
            max_depth: config.crawler.max_depth,
        };

        Self {
            config: config.crawler.clone(),
            ctx: Arc::new(ctx),
            phase: Some(Phase::Ready(queue)),
        }
    }

    /// Creates a crawler backed by the reqwest `HttpFetcher`
    pub fn with_http(config: &Config) -> Result<Self, CrawlError> {
        let fetcher = HttpFetcher::new(&config.fetcher)?;
        Ok(Self::new(config, Arc::new(fetcher)))
    }

    /// Token that cancels this crawl when triggered
    ///
    /// Cancelling stops new submissions immediately. Queued units finish
    /// without fetching; in-flight fetches follow the configured policy.
    pub fn cancel_token(&self) -> CancellationToken {
        self.ctx.cancel.clone()
    }

    pub fn cancel(&self) {
        self.ctx.cancel.cancel();
    }

    /// The visited set of this crawl
    pub fn visited(&self) -> &VisitedSet {
        &self.ctx.visited
    }

    /// Units submitted but not yet finished
    pub fn outstanding(&self) -> usize {
        self.ctx.tracker.outstanding()
    }

    /// Claims the seed URL, starts the worker pool and submits the depth-0 unit
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Returns
    ///
    /// * `Ok(())` - The seed is queued
    /// * `Err(CrawlError::UrlError)` - The seed is not a valid HTTP(S) URL
    /// * `Err(CrawlError::AlreadyStarted)` - `start` was already called
    /// * `Err(CrawlError::Config)` - The worker count is zero
    /// * `Err(CrawlError::PoolClosed)` - The worker pool refused the seed
    pub fn start(&mut self, seed_url: &str) -> Result<(), CrawlError> {
        if self.config.worker_count == 0 {
            return Err(ConfigError::Validation(
                "worker-count must be at least 1".to_string(),
            )
            .into());
        }

        let queue = match self.phase.take() {
            Some(Phase::Ready(queue)) => queue,
            other => {
                self.phase = other;
                return Err(CrawlError::AlreadyStarted);
            }
        };

        let seed = match canonicalize(seed_url) {
            Ok(seed) => seed,
            Err(e) => {
                self.phase = Some(Phase::Ready(queue));
                return Err(e.into());
            }
        };

        tracing::info!("Starting crawl from: {}", seed);
        tracing::info!(
            "Workers: {}, max depth: {}",
            self.config.worker_count,
            self.config.max_depth
        );

        let started_at = Instant::now();
        let pool = WorkerPool::spawn(
            self.config.worker_count as usize,
            queue,
            Arc::clone(&self.ctx),
        );
        tracing::debug!("{} workers ready", pool.worker_count());

        // Claimed and counted before anyone can wait on the tracker.
        self.ctx.visited.try_claim(&seed);
        if !self.ctx.submitter.submit(TaskUnit::seed(seed)) {
            if !self.ctx.cancel.is_cancelled() {
                // Dropping the pool releases its workers.
                return Err(CrawlError::PoolClosed);
            }
            tracing::warn!("Seed was not submitted, crawl was cancelled before it started");
            // Nothing was counted, so mark the run quiescent by hand.
            self.ctx.tracker.begin_unit();
            self.ctx.tracker.finish_unit();
        }

        self.phase = Some(Phase::Running { pool, started_at });
        Ok(())
    }

    /// Blocks until the crawl is quiescent, then releases the worker pool
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlStats)` - The crawl ran to completion
    /// * `Err(CrawlError::Cancelled)` - The crawl was cancelled or hit its
    ///   deadline; the error carries statistics for the work done so far
    /// * `Err(CrawlError::NotStarted)` - `start` was never called
    ///
    /// Dropping the returned future before it resolves releases the worker pool;
    /// the crawl cannot be resumed afterwards.
    pub async fn await_completion(&mut self) -> Result<CrawlStats, CrawlError> {
        let (pool, started_at) = match self.phase.take() {
            Some(Phase::Running { pool, started_at }) => (pool, started_at),
            Some(Phase::Finished(stats)) => {
                self.phase = Some(Phase::Finished(stats.clone()));
                return self.outcome(stats);
            }
            other => {
                self.phase = other;
                return Err(CrawlError::NotStarted);
            }
        };

        let tracker = Arc::clone(&self.ctx.tracker);

        match self.config.deadline() {
            Some(limit) => {
                let remaining = limit.saturating_sub(started_at.elapsed());
                tokio::select! {
                    _ = tracker.wait() => {}
                    _ = tokio::time::sleep(remaining) => {
                        tracing::warn!("Crawl deadline of {:?} reached, cancelling", limit);
                        self.ctx.cancel.cancel();
                        tracker.wait().await;
                    }
                }
            }
            None => tracker.wait().await,
        }

        pool.shutdown().await;

        let stats = self
            .ctx
            .counters
            .snapshot(self.ctx.visited.len(), started_at.elapsed());

        tracing::info!(
            "Crawl completed: {} unique URLs, {} pages fetched in {:?}",
            stats.unique_urls_visited,
            stats.pages_fetched,
            stats.elapsed
        );

        self.phase = Some(Phase::Finished(stats.clone()));
        self.outcome(stats)
    }

    /// Final statistics, available once `await_completion` has returned
    pub fn stats(&self) -> Option<CrawlStats> {
        match &self.phase {
            Some(Phase::Finished(stats)) => Some(stats.clone()),
            _ => None,
        }
    }

    fn outcome(&self, stats: CrawlStats) -> Result<CrawlStats, CrawlError> {
        if self.ctx.cancel.is_cancelled() {
            Err(CrawlError::Cancelled {
                stats,
                visited: self.ctx.visited.snapshot(),
            })
        } else {
            Ok(stats)
        }
    }
}

impl Drop for Crawler {
    /// Stops a crawl that is still running when its crawler goes away
    ///
    /// No new unit is submitted after this. A pool still held by the crawler is
    /// released by its own `Drop`.
    fn drop(&mut self) {
        if matches!(self.phase, Some(Phase::Finished(_))) {
            return;
        }
        self.ctx.cancel.cancel();
    }
}

/// Runs a complete crawl from the configured seed with the HTTP fetcher
///
/// # Arguments
///
/// * `config` - The crawler configuration
/// * `cancel` - Optional external cancellation signal (e.g. Ctrl-C)
///
/// # Returns
///
/// * `Ok((CrawlStats, Vec<String>))` - Statistics and the sorted visited URLs
/// * `Err(CrawlError)` - Setup failed, or the crawl was cancelled
pub async fn run_crawl(
    config: Config,
    cancel: Option<CancellationToken>,
) -> Result<(CrawlStats, Vec<String>), CrawlError> {
    let mut crawler = Crawler::with_http(&config)?;

    if let Some(external) = cancel {
        let token = crawler.cancel_token();
        tokio::spawn(async move {
            tokio::select! {
                _ = external.cancelled() => token.cancel(),
                _ = token.cancelled() => {}
            }
        });
    }

    crawler.start(&config.crawler.seed_url)?;
    let stats = crawler.await_completion().await?;
    Ok((stats, crawler.visited().snapshot()))
}

//! The crawl step: the unit of work a worker runs for one task unit

use crate::config::CancelPolicy;
use crate::crawler::fetcher::Fetcher;
use crate::crawler::scheduler::Submitter;
use crate::output::CrawlCounters;
use crate::state::{QuiescenceTracker, TaskUnit, VisitedSet};
use crate::url::LinkFilter;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// How often (in fetched pages) a progress line is logged
const PROGRESS_INTERVAL: usize = 10;

/// Everything a crawl step needs, shared by all workers of one crawl
pub struct CrawlContext {
    pub(crate) visited: Arc<VisitedSet>,
    pub(crate) tracker: Arc<QuiescenceTracker>,
    pub(crate) counters: Arc<CrawlCounters>,
    pub(crate) submitter: Submitter,
    pub(crate) fetcher: Arc<dyn Fetcher>,
    pub(crate) filter: LinkFilter,
    pub(crate) cancel: CancellationToken,
    pub(crate) cancel_policy: CancelPolicy,
    pub(crate) max_depth: u32,
}

impl CrawlContext {
    pub(crate) fn tracker(&self) -> Arc<QuiescenceTracker> {
        Arc::clone(&self.tracker)
    }
}

/// Runs one crawl step
///
/// 1. Stop if the unit is at or beyond `max_depth`
/// 2. Stop if the crawl has been cancelled
/// 3. Fetch the page; a fetch error is logged and ends the step with no links
/// 4. Filter each link, claim it in the visited set and submit the newly
///    claimed ones at `depth + 1`
///
/// The unit was claimed by whoever submitted it, so the step owns its URL and
/// fetches it without claiming again. Finishing the unit with the quiescence
/// tracker is left to the caller, which must do so only after this returns.
pub async fn crawl_step(ctx: &CrawlContext, unit: TaskUnit) {
    let url = unit.url();
    let depth = unit.depth();

    if unit.exceeds(ctx.max_depth) {
        tracing::trace!("Depth {} reached for {}, not fetching", depth, url);
        return;
    }

    if ctx.cancel.is_cancelled() {
        tracing::debug!("Crawl cancelled, skipping {}", url);
        return;
    }

    let fetched = match ctx.cancel_policy {
        CancelPolicy::Finish => ctx.fetcher.fetch_links(url).await,
        CancelPolicy::Abort => {
            tokio::select! {
                _ = ctx.cancel.cancelled() => {
                    tracing::debug!("Crawl cancelled, aborted fetch of {}", url);
                    return;
                }
                result = ctx.fetcher.fetch_links(url) => result,
            }
        }
    };

    let links = match fetched {
        Ok(links) => links,
        Err(e) => {
            tracing::warn!("Error crawling '{}': {}", url, e);
            ctx.counters.fetch_failed();
            return;
        }
    };

    let pages = ctx.counters.page_fetched(depth);

    let mut submitted = 0;
    for link in &links {
        let candidate = match ctx.filter.accept(link) {
            Ok(candidate) => candidate,
            Err(e) => {
                tracing::trace!("Discarding link {}: {}", link, e);
                continue;
            }
        };

        // Checked right before the claim, so a cancelled crawl claims nothing new.
        // A cancel landing between claim and submit can still leave one claimed,
        // unscheduled URL in the partial count.
        if ctx.cancel.is_cancelled() {
            break;
        }

        if !ctx.visited.try_claim(&candidate) {
            continue;
        }

        ctx.counters.link_discovered();
        if ctx.submitter.submit(unit.child(candidate)) {
            submitted += 1;
        }
    }

    tracing::info!(
        "Crawling({}): {} ({} links found, {} new)",
        depth,
        url,
        links.len(),
        submitted
    );

    if pages % PROGRESS_INTERVAL == 0 {
        tracing::info!(
            "Progress: {} pages fetched, {} units outstanding, {} URLs found",
            pages,
            ctx.tracker.outstanding(),
            ctx.visited.len()
        );
    }
}

//! Crawl statistics
//!
//! Workers bump the shared `CrawlCounters` as they go; the orchestrator turns
//! them into an immutable `CrawlStats` once the crawl is quiescent.

use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::time::Duration;

/// Summary of one crawl run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CrawlStats {
    /// Number of unique URLs claimed in the visited set
    pub unique_urls_visited: usize,

    /// Number of successful fetches
    pub pages_fetched: usize,

    /// Number of fetches that failed and were recovered locally
    pub fetch_errors: usize,

    /// Number of links that passed the filter and were newly claimed
    pub links_discovered: usize,

    /// Deepest depth at which a page was fetched
    pub max_depth_reached: u32,

    /// Wall-clock time from start to quiescence
    pub elapsed: Duration,
}

impl CrawlStats {
    pub fn elapsed_seconds(&self) -> f64 {
        self.elapsed.as_secs_f64()
    }
}

/// Counters shared by every worker during a crawl
#[derive(Debug, Default)]
pub struct CrawlCounters {
    pages_fetched: AtomicUsize,
    fetch_errors: AtomicUsize,
    links_discovered: AtomicUsize,
    max_depth_reached: AtomicU32,
}

impl CrawlCounters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a successful fetch and returns the running page count
    ///
    /// Each concurrent caller gets a distinct count.
    pub fn page_fetched(&self, depth: u32) -> usize {
        self.max_depth_reached.fetch_max(depth, Ordering::Relaxed);
        self.pages_fetched.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn fetch_failed(&self) {
        self.fetch_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn link_discovered(&self) {
        self.links_discovered.fetch_add(1, Ordering::Relaxed);
    }

    pub fn pages_fetched(&self) -> usize {
        self.pages_fetched.load(Ordering::Relaxed)
    }

    /// Builds a `CrawlStats` from the current counter values
    ///
    /// # Arguments
    ///
    /// * `unique_urls_visited` - Size of the visited set
    /// * `elapsed` - Time since the crawl started
    pub fn snapshot(&self, unique_urls_visited: usize, elapsed: Duration) -> CrawlStats {
        CrawlStats {
            unique_urls_visited,
            pages_fetched: self.pages_fetched.load(Ordering::Relaxed),
            fetch_errors: self.fetch_errors.load(Ordering::Relaxed),
            links_discovered: self.links_discovered.load(Ordering::Relaxed),
            max_depth_reached: self.max_depth_reached.load(Ordering::Relaxed),
            elapsed,
        }
    }
}

/// Prints the final crawl report to stdout
///
/// # Arguments
///
/// * `stats` - The statistics to display
/// * `cancelled` - Whether the crawl stopped early
pub fn print_report(stats: &CrawlStats, cancelled: bool) {
    println!("=====================================");
    if cancelled {
        println!("Crawling cancelled, partial results:");
    } else {
        println!("Crawling finished.");
    }
    println!("Total unique URLs visited: {}", stats.unique_urls_visited);
    println!("Pages fetched: {}", stats.pages_fetched);
    println!("Fetch errors: {}", stats.fetch_errors);
    println!("Links discovered: {}", stats.links_discovered);
    println!("Deepest fetched depth: {}", stats.max_depth_reached);
    println!("Time taken: {:.2} seconds", stats.elapsed_seconds());
    println!("=====================================");
}

/// Prints every visited URL, one per line
pub fn print_urls(urls: &[String]) {
    println!("\n=== All Discovered URLs ({}) ===", urls.len());
    for url in urls {
        println!("{}", url);
    }
    println!("=====================================");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_snapshot() {
        let counters = CrawlCounters::new();
        counters.page_fetched(0);
        counters.page_fetched(2);
        counters.page_fetched(1);
        counters.fetch_failed();
        counters.link_discovered();
        counters.link_discovered();

        let stats = counters.snapshot(5, Duration::from_millis(1500));

        assert_eq!(stats.unique_urls_visited, 5);
        assert_eq!(stats.pages_fetched, 3);
        assert_eq!(stats.fetch_errors, 1);
        assert_eq!(stats.links_discovered, 2);
        assert_eq!(stats.max_depth_reached, 2);
        assert!((stats.elapsed_seconds() - 1.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_page_fetched_returns_distinct_counts() {
        let counters = std::sync::Arc::new(CrawlCounters::new());

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let counters = std::sync::Arc::clone(&counters);
                std::thread::spawn(move || {
                    (0..100).map(|_| counters.page_fetched(1)).collect::<Vec<_>>()
                })
            })
            .collect();

        let mut seen: Vec<usize> = handles
            .into_iter()
            .flat_map(|h| h.join().unwrap())
            .collect();
        seen.sort_unstable();

        assert_eq!(seen, (1..=800).collect::<Vec<_>>());
        assert_eq!(counters.pages_fetched(), 800);
    }

    #[test]
    fn test_default_stats_are_empty() {
        let stats = CrawlStats::default();
        assert_eq!(stats.unique_urls_visited, 0);
        assert_eq!(stats.elapsed, Duration::ZERO);
    }
}

//! Output module for crawl statistics and reports

pub mod stats;

pub use stats::{print_report, print_urls, CrawlCounters, CrawlStats};

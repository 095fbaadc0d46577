//! Crawler module: the concurrent crawl scheduler
//!
//! This module contains the core crawling logic, including:
//! - The `Fetcher` capability and its reqwest implementation
//! - HTML link extraction
//! - The worker pool and non-blocking task submission
//! - The crawl step run for every task unit
//! - Overall crawl coordination and quiescence

mod coordinator;
mod fetcher;
mod parser;
mod scheduler;
mod step;

pub use coordinator::{run_crawl, Crawler};
pub use fetcher::{build_http_client, Fetcher, HttpFetcher};
pub use parser::extract_links;
pub use scheduler::{Submitter, WorkerPool};
pub use step::CrawlContext;

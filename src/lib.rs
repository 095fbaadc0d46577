//! Spider-Pool: a bounded-concurrency web crawler
//!
//! This crate crawls outward from a single seed URL with a fixed-size worker
//! pool. Every URL is claimed in a shared visited set before it is fetched, and
//! the crawl ends when an outstanding-work counter drops to zero rather than by
//! polling the queue.

pub mod config;
pub mod crawler;
pub mod output;
pub mod state;
pub mod url;

use thiserror::Error;

/// Main error type for Spider-Pool operations
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    /// `visited` is the sorted set of URLs claimed before the crawl stopped
    #[error("Crawl cancelled after visiting {} URLs", stats.unique_urls_visited)]
    Cancelled {
        stats: output::CrawlStats,
        visited: Vec<String>,
    },

    #[error("Crawl has already been started")]
    AlreadyStarted,

    #[error("Crawl has not been started")]
    NotStarted,

    #[error("Worker pool closed before the seed was submitted")]
    PoolClosed,
}

impl CrawlError {
    /// Returns the partial statistics carried by a cancellation, if any
    pub fn partial_stats(&self) -> Option<&output::CrawlStats> {
        match self {
            Self::Cancelled { stats, .. } => Some(stats),
            _ => None,
        }
    }

    /// Returns the URLs visited before a cancellation, if any
    pub fn partial_urls(&self) -> Option<&[String]> {
        match self {
            Self::Cancelled { visited, .. } => Some(visited),
            _ => None,
        }
    }
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid domain pattern: {0}")]
    InvalidPattern(String),
}

/// URL-specific errors
///
/// These are discard decisions made by the link filter, not crawl failures.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum UrlError {
    #[error("Empty URL")]
    Empty,

    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing domain in URL")]
    MissingDomain,

    #[error("Excluded URL {url}: {reason}")]
    Excluded { url: String, reason: String },
}

/// Errors produced while fetching a single page
///
/// A fetch error never aborts the crawl: the crawl step that hit it logs it
/// and finishes with zero discovered links.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("Connection failed for {url}")]
    Connect { url: String },

    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("Expected HTML from {url}, got {content_type}")]
    ContentMismatch { url: String, content_type: String },

    #[error("HTML parse error for {url}: {message}")]
    HtmlParse { url: String, message: String },

    #[error("Fetch of {url} failed: {message}")]
    Other { url: String, message: String },
}

/// Result type alias for Spider-Pool operations
pub type Result<T> = std::result::Result<T, CrawlError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{Crawler, Fetcher, HttpFetcher};
pub use output::CrawlStats;
pub use state::{QuiescenceTracker, TaskUnit, VisitedSet};
pub use crate::url::{canonicalize, LinkFilter};

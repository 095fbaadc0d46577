use serde::Deserialize;
use std::time::Duration;

/// Resource extensions that are never treated as crawlable documents
pub const DEFAULT_EXCLUDED_EXTENSIONS: &[&str] = &[
    "pdf", "jpg", "jpeg", "png", "gif", "svg", "webp", "ico", "bmp", "tif", "tiff", "css", "js",
    "json", "xml", "zip", "gz", "tgz", "tar", "rar", "7z", "mp3", "mp4", "m4a", "wav", "avi",
    "mov", "wmv", "webm", "exe", "dmg", "iso", "doc", "docx", "xls", "xlsx", "ppt", "pptx",
    "woff", "woff2", "ttf", "eot",
];

/// Main configuration structure for Spider-Pool
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub fetcher: FetcherConfig,
    #[serde(default)]
    pub filter: FilterConfig,
}

impl Config {
    /// Builds a configuration for `seed_url` with every other setting at its default
    pub fn for_seed(seed_url: impl Into<String>) -> Self {
        Self {
            crawler: CrawlerConfig {
                seed_url: seed_url.into(),
                worker_count: default_worker_count(),
                max_depth: default_max_depth(),
                deadline_secs: None,
                cancel_policy: CancelPolicy::default(),
            },
            fetcher: FetcherConfig::default(),
            filter: FilterConfig::default(),
        }
    }
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// URL the crawl starts from (depth 0)
    #[serde(rename = "seed-url")]
    pub seed_url: String,

    /// Number of concurrent worker slots
    #[serde(rename = "worker-count", default = "default_worker_count")]
    pub worker_count: u32,

    /// Units at this depth or deeper are never fetched
    #[serde(rename = "max-depth", default = "default_max_depth")]
    pub max_depth: u32,

    /// Optional wall-clock limit for the whole crawl (seconds)
    #[serde(rename = "deadline-secs", default)]
    pub deadline_secs: Option<u64>,

    /// What happens to in-flight fetches when the crawl is cancelled
    #[serde(rename = "cancel-policy", default)]
    pub cancel_policy: CancelPolicy,
}

impl CrawlerConfig {
    pub fn deadline(&self) -> Option<Duration> {
        self.deadline_secs.map(Duration::from_secs)
    }
}

/// Cancellation policy for fetches that are running when a cancel arrives
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CancelPolicy {
    /// Let the current fetch run to completion (bounded by the fetch timeout)
    #[default]
    Finish,
    /// Drop the current fetch at its next await point
    Abort,
}

/// HTTP fetcher configuration
#[derive(Debug, Clone, Deserialize)]
pub struct FetcherConfig {
    /// User-Agent header sent with every request
    #[serde(rename = "user-agent", default = "default_user_agent")]
    pub user_agent: String,

    /// Timeout for a whole request, independent of any crawl deadline (seconds)
    #[serde(rename = "timeout-secs", default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Timeout for establishing a connection (seconds)
    #[serde(rename = "connect-timeout-secs", default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,

    /// Whether HTTP redirects are followed
    #[serde(rename = "follow-redirects", default = "default_follow_redirects")]
    pub follow_redirects: bool,

    /// Maximum redirect hops when redirects are followed
    #[serde(rename = "max-redirects", default = "default_max_redirects")]
    pub max_redirects: u32,
}

impl FetcherConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            timeout_secs: default_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
            follow_redirects: default_follow_redirects(),
            max_redirects: default_max_redirects(),
        }
    }
}

/// Link filter configuration
#[derive(Debug, Clone, Deserialize)]
pub struct FilterConfig {
    /// File extensions (without the dot) that are never submitted
    #[serde(rename = "excluded-extensions", default = "default_excluded_extensions")]
    pub excluded_extensions: Vec<String>,

    /// Substrings that exclude a URL when present anywhere in it
    #[serde(rename = "excluded-patterns", default)]
    pub excluded_patterns: Vec<String>,

    /// Domain patterns (e.g., "example.com" or "*.example.com") that are never crawled
    #[serde(rename = "excluded-domains", default)]
    pub excluded_domains: Vec<String>,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            excluded_extensions: default_excluded_extensions(),
            excluded_patterns: Vec::new(),
            excluded_domains: Vec::new(),
        }
    }
}

fn default_worker_count() -> u32 {
    4
}

fn default_max_depth() -> u32 {
    2
}

fn default_user_agent() -> String {
    format!("SpiderPool/{}", env!("CARGO_PKG_VERSION"))
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_connect_timeout_secs() -> u64 {
    5
}

fn default_follow_redirects() -> bool {
    true
}

fn default_max_redirects() -> u32 {
    10
}

fn default_excluded_extensions() -> Vec<String> {
    DEFAULT_EXCLUDED_EXTENSIONS
        .iter()
        .map(|ext| ext.to_string())
        .collect()
}

//! Page fetching
//!
//! The crawl step only sees the `Fetcher` trait: give it a URL, get back the
//! absolute links found on that page or an error. `HttpFetcher` is the
//! production implementation; tests substitute scripted fetchers.

use crate::config::FetcherConfig;
use crate::crawler::parser::extract_links;
use crate::FetchError;
use async_trait::async_trait;
use reqwest::{redirect::Policy, Client};
use url::Url;

/// Fetches a page and returns the outbound links found on it
///
/// Implementations hold no crawl state and must never panic on bad input;
/// every failure is reported as a `FetchError`.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch_links(&self, url: &Url) -> Result<Vec<String>, FetchError>;
}

/// Builds an HTTP client from the fetcher configuration
///
/// # Arguments
///
/// * `config` - The fetcher configuration
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
///
/// # Example
///
/// ```no_run
/// use spider_pool::config::FetcherConfig;
/// use spider_pool::crawler::build_http_client;
///
/// let client = build_http_client(&FetcherConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &FetcherConfig) -> Result<Client, reqwest::Error> {
    let redirect = if config.follow_redirects {
        Policy::limited(config.max_redirects as usize)
    } else {
        Policy::none()
    };

    Client::builder()
        .user_agent(config.user_agent.clone())
        .timeout(config.timeout())
        .connect_timeout(config.connect_timeout())
        .redirect(redirect)
        .gzip(true)
        .brotli(true)
        .build()
}

/// reqwest-backed fetcher that parses HTML responses for links
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(config: &FetcherConfig) -> Result<Self, reqwest::Error> {
        Ok(Self::with_client(build_http_client(config)?))
    }

    /// Wraps an already configured client, e.g. one shared with other callers
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    /// Fetches `url` and extracts its links
    ///
    /// # Error Classification
    ///
    /// | Condition | Error |
    /// |-----------|-------|
    /// | Request timeout | `Timeout` |
    /// | Connection refused, DNS, TLS | `Connect` |
    /// | Non-2xx status (including unfollowed redirects) | `Status` |
    /// | Content-Type is not HTML | `ContentMismatch` |
    /// | Body could not be read | `Http` |
    ///
    /// Links are resolved against the final URL after redirects.
    async fn fetch_links(&self, url: &Url) -> Result<Vec<String>, FetchError> {
        let response = self
            .client
            .get(url.as_str())
            .send()
            .await
            .map_err(|e| classify_error(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let final_url = response.url().clone();

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();

        if !is_html(&content_type) {
            return Err(FetchError::ContentMismatch {
                url: url.to_string(),
                content_type,
            });
        }

        let body = response.text().await.map_err(|e| classify_error(url, e))?;

        Ok(extract_links(&body, &final_url))
    }
}

/// Missing Content-Type is treated as HTML
fn is_html(content_type: &str) -> bool {
    let content_type = content_type.to_ascii_lowercase();
    content_type.is_empty()
        || content_type.contains("text/html")
        || content_type.contains("application/xhtml+xml")
}

fn classify_error(url: &Url, error: reqwest::Error) -> FetchError {
    if error.is_timeout() {
        FetchError::Timeout {
            url: url.to_string(),
        }
    } else if error.is_connect() {
        FetchError::Connect {
            url: url.to_string(),
        }
    } else {
        FetchError::Http {
            url: url.to_string(),
            source: error,
        }
    }
}

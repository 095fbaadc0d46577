//! Link filter applied to every candidate link before it is claimed
//!
//! A rejected link is a discard decision, never a crawl error.

use crate::config::FilterConfig;
use crate::url::{canonicalize, matches_domain_pattern};
use crate::UrlError;
use url::Url;

const EMBEDDED_MAILTO: &str = "mailto:";

/// Decides which discovered links become new task units
#[derive(Debug, Clone)]
pub struct LinkFilter {
    /// Lowercased extensions without the leading dot
    excluded_extensions: Vec<String>,
    excluded_patterns: Vec<String>,
    excluded_domains: Vec<String>,
}

impl LinkFilter {
    pub fn new(config: &FilterConfig) -> Self {
        Self {
            excluded_extensions: config
                .excluded_extensions
                .iter()
                .map(|ext| ext.to_ascii_lowercase())
                .collect(),
            excluded_patterns: config.excluded_patterns.clone(),
            excluded_domains: config.excluded_domains.clone(),
        }
    }

    /// Canonicalizes `link` and checks it against the exclusion rules
    ///
    /// # Returns
    ///
    /// * `Ok(Url)` - The canonical, fragment-free URL to claim and submit
    /// * `Err(UrlError)` - Why the link was discarded
    pub fn accept(&self, link: &str) -> Result<Url, UrlError> {
        let url = canonicalize(link)?;

        // Share and redirect links can carry a mail link inside an http URL.
        if url.as_str().to_ascii_lowercase().contains(EMBEDDED_MAILTO) {
            return Err(UrlError::Excluded {
                url: url.to_string(),
                reason: "contains a mailto: link".to_string(),
            });
        }

        if let Some(ext) = self.excluded_extension(&url) {
            return Err(UrlError::Excluded {
                url: url.to_string(),
                reason: format!("resource extension .{}", ext),
            });
        }

        if let Some(pattern) = self
            .excluded_patterns
            .iter()
            .find(|pattern| url.as_str().contains(pattern.as_str()))
        {
            return Err(UrlError::Excluded {
                url: url.to_string(),
                reason: format!("matches excluded pattern '{}'", pattern),
            });
        }

        let host = url.host_str().unwrap_or_default();
        if let Some(pattern) = self
            .excluded_domains
            .iter()
            .find(|pattern| matches_domain_pattern(pattern, host))
        {
            return Err(UrlError::Excluded {
                url: url.to_string(),
                reason: format!("domain matches '{}'", pattern),
            });
        }

        Ok(url)
    }

    /// Returns the extension of the last path segment if it is excluded
    fn excluded_extension(&self, url: &Url) -> Option<&str> {
        let last_segment = url.path_segments()?.next_back()?;
        let (_, ext) = last_segment.rsplit_once('.')?;
        let ext = ext.to_ascii_lowercase();

        self.excluded_extensions
            .iter()
            .find(|excluded| **excluded == ext)
            .map(String::as_str)
    }
}

impl Default for LinkFilter {
    fn default() -> Self {
        Self::new(&FilterConfig::default())
    }
}

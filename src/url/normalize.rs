use crate::UrlError;
use url::Url;

/// Schemes rejected before parsing is even attempted
const NON_DOCUMENT_SCHEMES: &[&str] = &["javascript:", "mailto:", "tel:", "data:"];

/// Canonicalizes a URL into the key used for deduplication
///
/// # Canonicalization Steps
///
/// 1. Trim whitespace; reject empty input
/// 2. Reject `javascript:`, `mailto:`, `tel:` and `data:` links
/// 3. Parse the URL; reject if malformed or relative
/// 4. Accept only HTTP and HTTPS
/// 5. Require a host (the `url` crate lowercases it and resolves dot segments)
/// 6. Strip the fragment, so `page#a` and `page#b` share one key
///
/// A fragment never causes rejection on its own: the page without the fragment
/// may still be new.
///
/// # Examples
///
/// ```
/// use spider_pool::url::canonicalize;
///
/// let url = canonicalize("http://EXAMPLE.com/a/../page#section").unwrap();
/// assert_eq!(url.as_str(), "http://example.com/page");
/// ```
pub fn canonicalize(url_str: &str) -> Result<Url, UrlError> {
    let trimmed = url_str.trim();
    if trimmed.is_empty() {
        return Err(UrlError::Empty);
    }

    let lowered = trimmed.to_ascii_lowercase();
    if let Some(scheme) = NON_DOCUMENT_SCHEMES
        .iter()
        .find(|scheme| lowered.starts_with(**scheme))
    {
        return Err(UrlError::InvalidScheme(scheme.trim_end_matches(':').to_string()));
    }

    let mut url = Url::parse(trimmed).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(url.scheme().to_string()));
    }

    if url.host_str().map_or(true, str::is_empty) {
        return Err(UrlError::MissingDomain);
    }

    url.set_fragment(None);

    Ok(url)
}

//! HTML link extraction
//!
//! Extraction only resolves hrefs to absolute form. Deciding which links are
//! worth crawling is the link filter's job.

use scraper::{Html, Selector};
use url::Url;

/// Extracts every outbound link from an HTML document
///
/// # Link Extraction Rules
///
/// **Include:**
/// - `<a href="...">` tags
/// - `<link rel="canonical" href="...">`
///
/// **Exclude:**
/// - `<a href="..." download>`
/// - hrefs that cannot be resolved against `base_url`
///
/// Fragment-only hrefs such as `#section` resolve to `base_url` with a fragment
/// and are returned like any other link.
///
/// # Example
///
/// ```
/// use spider_pool::crawler::extract_links;
/// use url::Url;
///
/// let html = r#"<html><body><a href="/page">Link</a></body></html>"#;
/// let base_url = Url::parse("https://example.com/").unwrap();
/// assert_eq!(extract_links(html, &base_url), vec!["https://example.com/page"]);
/// ```
pub fn extract_links(html: &str, base_url: &Url) -> Vec<String> {
    let document = Html::parse_document(html);
    let mut links = Vec::new();

    if let Ok(a_selector) = Selector::parse("a[href]") {
        for element in document.select(&a_selector) {
            if element.value().attr("download").is_some() {
                continue;
            }

            if let Some(absolute_url) = element
                .value()
                .attr("href")
                .and_then(|href| resolve_link(href, base_url))
            {
                links.push(absolute_url);
            }
        }
    }

    if let Ok(canonical_selector) = Selector::parse("link[rel='canonical'][href]") {
        for element in document.select(&canonical_selector) {
            if let Some(absolute_url) = element
                .value()
                .attr("href")
                .and_then(|href| resolve_link(href, base_url))
            {
                links.push(absolute_url);
            }
        }
    }

    links
}

/// Resolves an href against the page URL
fn resolve_link(href: &str, base_url: &Url) -> Option<String> {
    let href = href.trim();
    if href.is_empty() {
        return None;
    }

    base_url.join(href).ok().map(|url| url.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_url() -> Url {
        Url::parse("https://example.com/page").unwrap()
    }

    #[test]
    fn test_extract_absolute_link() {
        let html = r#"<html><body><a href="https://other.com/page">Link</a></body></html>"#;
        let links = extract_links(html, &base_url());
        assert_eq!(links, vec!["https://other.com/page"]);
    }

    #[test]
    fn test_extract_relative_links() {
        let html = r#"<html><body><a href="/other">A</a><a href="sibling">B</a></body></html>"#;
        let links = extract_links(html, &base_url());
        assert_eq!(
            links,
            vec!["https://example.com/other", "https://example.com/sibling"]
        );
    }

    #[test]
    fn test_fragment_only_link_resolves_to_page() {
        let html = r##"<html><body><a href="#section">Jump</a></body></html>"##;
        let links = extract_links(html, &base_url());
        assert_eq!(links, vec!["https://example.com/page#section"]);
    }

    #[test]
    fn test_skip_download_and_empty_links() {
        let html = r#"<html><body>
            <a href="/file.zip" download>Download</a>
            <a href="   ">Blank</a>
        </body></html>"#;
        let links = extract_links(html, &base_url());
        assert!(links.is_empty());
    }

    #[test]
    fn test_special_schemes_passed_through() {
        let html = r#"<html><body><a href="mailto:test@example.com">Email</a></body></html>"#;
        let links = extract_links(html, &base_url());
        assert_eq!(links, vec!["mailto:test@example.com"]);
    }

    #[test]
    fn test_extract_canonical_link() {
        let html = r#"<html><head><link rel="canonical" href="https://example.com/canonical" /></head><body></body></html>"#;
        let links = extract_links(html, &base_url());
        assert!(links.contains(&"https://example.com/canonical".to_string()));
    }

    #[test]
    fn test_stylesheet_links_ignored() {
        let html = r#"<html><head><link rel="stylesheet" href="/style.css" /></head><body></body></html>"#;
        assert!(extract_links(html, &base_url()).is_empty());
    }
}

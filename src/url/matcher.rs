/// Checks whether a host matches an excluded-domain pattern
///
/// `"example.com"` matches only that host. `"*.example.com"` matches the bare
/// domain and any subdomain of it, at any nesting level. Comparison ignores
/// ASCII case on both sides.
///
/// # Examples
///
/// ```
/// use spider_pool::url::matches_domain_pattern;
///
/// assert!(matches_domain_pattern("example.com", "example.com"));
/// assert!(!matches_domain_pattern("example.com", "blog.example.com"));
/// assert!(matches_domain_pattern("*.example.com", "api.v2.example.com"));
/// assert!(!matches_domain_pattern("*.example.com", "notexample.com"));
/// ```
pub fn matches_domain_pattern(pattern: &str, host: &str) -> bool {
    let pattern = pattern.to_ascii_lowercase();
    let host = host.to_ascii_lowercase();

    match pattern.strip_prefix("*.") {
        Some(base) => host == base || host.ends_with(&format!(".{}", base)),
        None => host == pattern,
    }
}

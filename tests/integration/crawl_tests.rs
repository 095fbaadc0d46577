//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! fetching and the full crawl cycle end-to-end.

use spider_pool::config::{Config, FetcherConfig};
use spider_pool::crawler::{run_crawl, Fetcher, HttpFetcher};
use spider_pool::{CrawlError, Crawler, FetchError};
use std::time::Duration;
use url::Url;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration crawling from the root of `base_url`
fn create_test_config(base_url: &str, max_depth: u32) -> Config {
    let mut config = Config::for_seed(format!("{}/", base_url));
    config.crawler.max_depth = max_depth;
    config.crawler.worker_count = 4;
    config.fetcher.user_agent = "TestBot/1.0".to_string();
    config.fetcher.timeout_secs = 5;
    config
}

fn html_page(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_raw(
            format!("<html><body>{}</body></html>", body),
            "text/html; charset=utf-8",
        )
}

async fn mount_page(server: &MockServer, page_path: &str, body: &str, hits: u64) {
    Mock::given(method("GET"))
        .and(path(page_path))
        .respond_with(html_page(body))
        .expect(hits)
        .mount(server)
        .await;
}

fn page_url(server: &MockServer, page_path: &str) -> Url {
    Url::parse(&format!("{}{}", server.uri(), page_path)).expect("Failed to parse mock URL")
}

#[tokio::test]
async fn test_fetch_extracts_resolved_links() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/docs/"))
        .and(header("user-agent", "TestBot/1.0"))
        .respond_with(html_page(
            r#"<a href="intro">Intro</a>
               <a href="/about">About</a>
               <a href="https://other.example/x">Elsewhere</a>
               <a href="/file.zip" download>Download</a>"#,
        ))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server.uri(), 2);
    let fetcher = HttpFetcher::new(&config.fetcher).expect("Failed to build fetcher");

    let links = fetcher
        .fetch_links(&page_url(&mock_server, "/docs/"))
        .await
        .expect("Fetch should succeed");

    assert_eq!(
        links,
        vec![
            format!("{}/docs/intro", mock_server.uri()),
            format!("{}/about", mock_server.uri()),
            "https://other.example/x".to_string(),
        ]
    );
}

#[tokio::test]
async fn test_fetch_not_found_is_status_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/gone"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let fetcher = HttpFetcher::new(&FetcherConfig::default()).expect("Failed to build fetcher");
    let result = fetcher.fetch_links(&page_url(&mock_server, "/gone")).await;

    assert!(matches!(result, Err(FetchError::Status { status: 404, .. })));
}

#[tokio::test]
async fn test_fetch_non_html_is_content_mismatch() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/data"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(r#"{"links": []}"#, "application/json"),
        )
        .mount(&mock_server)
        .await;

    let fetcher = HttpFetcher::new(&FetcherConfig::default()).expect("Failed to build fetcher");
    let result = fetcher.fetch_links(&page_url(&mock_server, "/data")).await;

    match result {
        Err(FetchError::ContentMismatch { content_type, .. }) => {
            assert_eq!(content_type, "application/json");
        }
        other => panic!("Expected ContentMismatch, got {:?}", other),
    }
}

#[tokio::test]
async fn test_fetch_follows_redirects_and_resolves_against_target() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/old"))
        .respond_with(ResponseTemplate::new(301).insert_header("location", "/new/"))
        .mount(&mock_server)
        .await;
    mount_page(&mock_server, "/new/", r#"<a href="child">Child</a>"#, 1).await;

    let fetcher = HttpFetcher::new(&FetcherConfig::default()).expect("Failed to build fetcher");
    let links = fetcher
        .fetch_links(&page_url(&mock_server, "/old"))
        .await
        .expect("Fetch should follow the redirect");

    assert_eq!(links, vec![format!("{}/new/child", mock_server.uri())]);
}

#[tokio::test]
async fn test_fetch_without_redirects_reports_status() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/old"))
        .respond_with(ResponseTemplate::new(301).insert_header("location", "/new/"))
        .mount(&mock_server)
        .await;
    mount_page(&mock_server, "/new/", "", 0).await;

    let config = FetcherConfig {
        follow_redirects: false,
        ..FetcherConfig::default()
    };
    let fetcher = HttpFetcher::new(&config).expect("Failed to build fetcher");
    let result = fetcher.fetch_links(&page_url(&mock_server, "/old")).await;

    assert!(matches!(result, Err(FetchError::Status { status: 301, .. })));
}

#[tokio::test]
async fn test_fetch_timeout() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(html_page("").set_delay(Duration::from_secs(3)))
        .mount(&mock_server)
        .await;

    let config = FetcherConfig {
        timeout_secs: 1,
        ..FetcherConfig::default()
    };
    let fetcher = HttpFetcher::new(&config).expect("Failed to build fetcher");
    let result = fetcher.fetch_links(&page_url(&mock_server, "/slow")).await;

    assert!(matches!(result, Err(FetchError::Timeout { .. })));
}

#[tokio::test]
async fn test_full_crawl_small_site() {
    let mock_server = MockServer::start().await;

    // Depth 0 and depth 1 pages are fetched exactly once
    mount_page(
        &mock_server,
        "/",
        r#"<a href="b">B</a>
           <a href="/c">C</a>
           <a href="/b#top">B again</a>
           <a href="report.pdf">Report</a>
           <a href="mailto:someone@example.com">Mail</a>
           <a href="/missing">Missing</a>"#,
        1,
    )
    .await;
    mount_page(&mock_server, "/b", r#"<a href="/">Home</a><a href="/d">D</a>"#, 1).await;
    mount_page(&mock_server, "/c", "", 1).await;

    // Depth 2 is discovered but never fetched
    mount_page(&mock_server, "/d", r#"<a href="/b">B</a>"#, 0).await;

    Mock::given(method("GET"))
        .and(path("/report.pdf"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server.uri(), 2);
    let mut crawler = Crawler::with_http(&config).expect("Failed to create crawler");

    crawler
        .start(&config.crawler.seed_url)
        .expect("Failed to start crawl");
    let stats = crawler
        .await_completion()
        .await
        .expect("Crawl should complete");

    assert_eq!(stats.unique_urls_visited, 5);
    assert_eq!(stats.pages_fetched, 3);
    assert_eq!(stats.fetch_errors, 1);
    assert_eq!(stats.links_discovered, 4);
    assert_eq!(stats.max_depth_reached, 1);

    let base = mock_server.uri();
    let mut expected = vec![
        format!("{}/", base),
        format!("{}/b", base),
        format!("{}/c", base),
        format!("{}/d", base),
        format!("{}/missing", base),
    ];
    expected.sort();
    assert_eq!(crawler.visited().snapshot(), expected);
    assert_eq!(crawler.outstanding(), 0);
}

#[tokio::test]
async fn test_run_crawl_with_single_worker() {
    let mock_server = MockServer::start().await;

    mount_page(&mock_server, "/", r#"<a href="/one">1</a><a href="/two">2</a>"#, 1).await;
    mount_page(&mock_server, "/one", r#"<a href="/two">2</a><a href="/">Home</a>"#, 1).await;
    mount_page(&mock_server, "/two", r#"<a href="/one">1</a>"#, 1).await;

    let mut config = create_test_config(&mock_server.uri(), 5);
    config.crawler.worker_count = 1;

    let (stats, urls) = run_crawl(config, None).await.expect("Crawl should complete");

    assert_eq!(stats.unique_urls_visited, 3);
    assert_eq!(stats.pages_fetched, 3);
    assert_eq!(urls.len(), 3);
    assert!(urls.windows(2).all(|pair| pair[0] <= pair[1]));
}

#[tokio::test]
async fn test_excluded_patterns_and_domains_are_not_crawled() {
    let mock_server = MockServer::start().await;

    mount_page(
        &mock_server,
        "/",
        r#"<a href="/keep">Keep</a>
           <a href="/admin/panel">Admin</a>
           <a href="https://ads.tracker.example/pixel">Ad</a>"#,
        1,
    )
    .await;
    mount_page(&mock_server, "/keep", "", 1).await;
    mount_page(&mock_server, "/admin/panel", "", 0).await;

    let mut config = create_test_config(&mock_server.uri(), 3);
    config.filter.excluded_patterns = vec!["/admin/".to_string()];
    config.filter.excluded_domains = vec!["*.tracker.example".to_string()];

    let (stats, urls) = run_crawl(config, None).await.expect("Crawl should complete");

    assert_eq!(stats.unique_urls_visited, 2);
    assert!(urls.iter().all(|u| !u.contains("admin") && !u.contains("tracker")));
}

#[tokio::test]
async fn test_external_cancel_returns_partial_stats() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html_page(r#"<a href="/next">Next</a>"#).set_delay(Duration::from_millis(500)))
        .expect(1)
        .mount(&mock_server)
        .await;
    mount_page(&mock_server, "/next", "", 0).await;

    let config = create_test_config(&mock_server.uri(), 3);
    let cancel = tokio_util::sync::CancellationToken::new();

    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        trigger.cancel();
    });

    match run_crawl(config, Some(cancel)).await {
        Err(CrawlError::Cancelled { stats, visited }) => {
            // The in-flight fetch of the seed finishes, its child is refused
            assert_eq!(stats.pages_fetched, 1);
            assert_eq!(stats.unique_urls_visited, 1);
            assert_eq!(visited, vec![format!("{}/", mock_server.uri())]);
        }
        other => panic!("Expected Cancelled, got {:?}", other.map(|(s, _)| s)),
    }
}

//! Integration tests for `walk`.
//!
//! Each test stands up a `wiremock` server as the site under test, so the
//! traversal limits and fallback probing are checked against real HTTP.

use std::time::Duration;

use bizprof_core::FallbackPolicy;
use bizprof_scraper::{walk, CrawlOptions, FetchError, PageFetcher};
use url::Url;
use wiremock::matchers::{any, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_fetcher() -> PageFetcher {
    PageFetcher::new(5, "bizprof-test/0.1").expect("failed to build test PageFetcher")
}

fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .insert_header("content-type", "text/html; charset=utf-8")
        .set_body_string(format!("<html><body>{body}</body></html>"))
}

fn options(max_pages: usize, max_depth: usize) -> CrawlOptions {
    CrawlOptions {
        max_pages,
        max_depth,
        concurrency: 2,
        deadline: Duration::from_secs(20),
        min_corpus_chars: 0,
        fallback_policy: FallbackPolicy::Never,
        fallback_paths: Vec::new(),
    }
}

async fn mount_page(server: &MockServer, route: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(html(body))
        .mount(server)
        .await;
}

fn root_of(server: &MockServer) -> Url {
    Url::parse(&format!("{}/", server.uri())).expect("mock server uri")
}

async fn request_count(server: &MockServer) -> usize {
    server
        .received_requests()
        .await
        .map_or(0, |requests| requests.len())
}

// ---------------------------------------------------------------------------
// Budget and origin
// ---------------------------------------------------------------------------

#[tokio::test]
async fn walk_respects_page_budget_and_never_leaves_origin() {
    let site = MockServer::start().await;
    let elsewhere = MockServer::start().await;

    let mut links: String = (1..=10)
        .map(|i| format!(r#"<a href="/page-{i}">Page {i}</a>"#))
        .collect();
    links.push_str(&format!(r#"<a href="{}/offsite">Partner</a>"#, elsewhere.uri()));
    mount_page(&site, "/", &format!("<p>Home</p>{links}")).await;
    for i in 1..=10 {
        mount_page(&site, &format!("/page-{i}"), &format!("<p>Page {i}</p>")).await;
    }
    Mock::given(any())
        .respond_with(html("<p>Offsite</p>"))
        .mount(&elsewhere)
        .await;

    let outcome = walk(&test_fetcher(), &root_of(&site), &options(5, 1)).await;

    assert_eq!(outcome.pages.len(), 5);
    assert!(request_count(&site).await <= 5);
    assert_eq!(request_count(&elsewhere).await, 0);
    assert_eq!(outcome.pages[0].url, root_of(&site));
}

#[tokio::test]
async fn walk_stops_following_links_at_max_depth() {
    let site = MockServer::start().await;
    mount_page(&site, "/", r#"<p>Home</p><a href="/a">A</a>"#).await;
    mount_page(&site, "/a", r#"<p>A</p><a href="/b">B</a>"#).await;
    mount_page(&site, "/b", "<p>B</p>").await;

    let outcome = walk(&test_fetcher(), &root_of(&site), &options(10, 1)).await;

    let urls: Vec<String> = outcome.pages.iter().map(|p| p.url.path().to_string()).collect();
    assert_eq!(urls, vec!["/", "/a"]);
}

#[tokio::test]
async fn walk_fetches_each_url_once() {
    let site = MockServer::start().await;
    mount_page(
        &site,
        "/",
        r#"<a href="/a">A</a><a href="/a#team">A again</a><a href="/">Home</a>"#,
    )
    .await;
    mount_page(&site, "/a", r#"<a href="/">Home</a>"#).await;

    walk(&test_fetcher(), &root_of(&site), &options(10, 3)).await;

    assert_eq!(request_count(&site).await, 2);
}

// ---------------------------------------------------------------------------
// Failures
// ---------------------------------------------------------------------------

#[tokio::test]
async fn walk_records_failed_pages_without_aborting() {
    let site = MockServer::start().await;
    mount_page(
        &site,
        "/",
        r#"<p>Home</p><a href="/missing">Gone</a><a href="/about">About</a>"#,
    )
    .await;
    mount_page(&site, "/about", "<p>About us</p>").await;

    let outcome = walk(&test_fetcher(), &root_of(&site), &options(10, 1)).await;

    assert_eq!(outcome.pages.len(), 2);
    assert_eq!(outcome.failures.len(), 1);
    let failure = &outcome.failures[0];
    assert_eq!(failure.url.path(), "/missing");
    assert!(
        matches!(failure.error, FetchError::Status { status: 404, .. }),
        "expected 404 status error, got: {:?}",
        failure.error
    );
}

// ---------------------------------------------------------------------------
// Fallback probing
// ---------------------------------------------------------------------------

#[tokio::test]
async fn walk_probes_fallback_paths_when_corpus_is_thin() {
    let site = MockServer::start().await;
    mount_page(&site, "/", "<p>Hi</p>").await;
    mount_page(&site, "/contact", "<p>Call us at (617) 555-0101 any weekday.</p>").await;

    let opts = CrawlOptions {
        min_corpus_chars: 200,
        fallback_policy: FallbackPolicy::WhenThin,
        fallback_paths: vec!["contact".to_string(), "about-us".to_string()],
        ..options(10, 2)
    };
    let outcome = walk(&test_fetcher(), &root_of(&site), &opts).await;

    assert_eq!(outcome.pages.len(), 2);
    assert!(outcome.corpus().contains("(617) 555-0101"));
    assert_eq!(outcome.failures.len(), 1, "about-us is not mounted");
}

#[tokio::test]
async fn walk_skips_fallback_paths_when_policy_is_never() {
    let site = MockServer::start().await;
    mount_page(&site, "/", "<p>Hi</p>").await;
    mount_page(&site, "/contact", "<p>Contact</p>").await;

    let opts = CrawlOptions {
        min_corpus_chars: 200,
        fallback_paths: vec!["contact".to_string()],
        ..options(10, 2)
    };
    let outcome = walk(&test_fetcher(), &root_of(&site), &opts).await;

    assert_eq!(outcome.pages.len(), 1);
    assert_eq!(request_count(&site).await, 1);
}

#[tokio::test]
async fn walk_does_not_probe_paths_already_crawled() {
    let site = MockServer::start().await;
    mount_page(&site, "/", r#"<p>Hi</p><a href="/contact">Contact</a>"#).await;
    mount_page(&site, "/contact", "<p>Reach us</p>").await;

    let opts = CrawlOptions {
        min_corpus_chars: 10_000,
        fallback_policy: FallbackPolicy::Always,
        fallback_paths: vec!["contact".to_string()],
        ..options(10, 2)
    };
    let outcome = walk(&test_fetcher(), &root_of(&site), &opts).await;

    assert_eq!(outcome.pages.len(), 2);
    assert_eq!(request_count(&site).await, 2);
}

// ---------------------------------------------------------------------------
// Deadline
// ---------------------------------------------------------------------------

#[tokio::test]
async fn walk_abandons_hanging_pages_at_the_deadline() {
    let site = MockServer::start().await;
    mount_page(&site, "/", r#"<p>Home</p><a href="/slow">Slow</a>"#).await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(html("<p>Too late</p>").set_delay(Duration::from_secs(30)))
        .mount(&site)
        .await;

    let opts = CrawlOptions {
        deadline: Duration::from_secs(2),
        ..options(10, 2)
    };
    let started = std::time::Instant::now();
    let outcome = walk(&test_fetcher(), &root_of(&site), &opts).await;

    assert!(
        started.elapsed() < Duration::from_secs(5),
        "walk ran for {:?}",
        started.elapsed()
    );
    assert_eq!(outcome.pages.len(), 1);
    assert_eq!(outcome.pages[0].url, root_of(&site));
    assert_eq!(outcome.failures.len(), 1);
    assert!(
        matches!(outcome.failures[0].error, FetchError::Deadline { .. }),
        "unexpected failure: {:?}",
        outcome.failures[0].error
    );
}

#[tokio::test]
async fn walk_does_not_follow_redirects_off_the_site() {
    let site = MockServer::start().await;
    let elsewhere = MockServer::start().await;
    mount_page(&site, "/", r#"<p>Home</p><a href="/moved">Moved</a>"#).await;
    Mock::given(method("GET"))
        .and(path("/moved"))
        .respond_with(
            ResponseTemplate::new(302)
                .insert_header("location", format!("{}/landing", elsewhere.uri()).as_str()),
        )
        .mount(&site)
        .await;
    Mock::given(any())
        .respond_with(html("<p>Offsite</p>"))
        .mount(&elsewhere)
        .await;

    let outcome = walk(&test_fetcher(), &root_of(&site), &options(10, 2)).await;

    assert_eq!(outcome.pages.len(), 1);
    assert_eq!(request_count(&elsewhere).await, 0);
    assert_eq!(outcome.failures.len(), 1);
    assert!(
        matches!(outcome.failures[0].error, FetchError::Status { status: 302, .. }),
        "unexpected failure: {:?}",
        outcome.failures[0].error
    );
}

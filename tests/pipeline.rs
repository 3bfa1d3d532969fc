//! End-to-end runs against a local mock server: feed resolution, article
//! fetching, retries, and the result file.
//!
//! Every test uses zero-length delay ranges so retries and pacing don't slow
//! the suite down.

use allnews::config::Config;
use allnews::pipeline::Pipeline;
use allnews::retry::DelayRange;
use pretty_assertions::assert_eq;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn fast_config(output_dir: &std::path::Path) -> Config {
    Config {
        output_dir: output_dir.to_path_buf(),
        request_timeout_secs: 5,
        feed_retry_delay: DelayRange::zero(),
        article_retry_delay: DelayRange::zero(),
        article_pacing_delay: DelayRange::zero(),
        ..Config::default()
    }
}

fn rss(links: &[String]) -> String {
    let items: String = links
        .iter()
        .map(|l| format!("<item><title>t</title><link>{l}</link></item>"))
        .collect();
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?><rss version="2.0"><channel><title>Test</title><link>https://example.com/</link>{items}</channel></rss>"#
    )
}

fn article_page(text: &str) -> String {
    format!("<html><head><title>x</title></head><body><nav>Home</nav><p>{text}</p><footer>(c)</footer></body></html>")
}

async fn mount_get(server: &MockServer, at: &str, status: u16, body: String) {
    Mock::given(method("GET"))
        .and(path(at))
        .respond_with(ResponseTemplate::new(status).set_body_string(body))
        .mount(server)
        .await;
}

/// Split a result file back into (url, content) pairs.
fn parse_blocks(text: &str) -> Vec<(String, String)> {
    text.split_terminator("\n\n")
        .map(|block| {
            let (url_line, content) = block.split_once('\n').unwrap();
            (
                url_line.strip_prefix("URL: ").unwrap().to_string(),
                content.strip_prefix("Content: ").unwrap().to_string(),
            )
        })
        .collect()
}

// ============================================================================
// Happy path
// ============================================================================

#[tokio::test]
async fn test_two_articles_written_without_retries() {
    let server = MockServer::start().await;
    let base = server.uri();
    let first = format!("{base}/news/first");
    let second = format!("{base}/news/second");

    mount_get(&server, "/feed", 200, rss(&[first.clone(), second.clone()])).await;
    mount_get(
        &server,
        "/news/first",
        200,
        article_page("The first story has enough paragraph text to clear the floor."),
    )
    .await;
    mount_get(
        &server,
        "/news/second",
        200,
        article_page("The second story also has enough paragraph text to be kept."),
    )
    .await;

    let dir = tempfile::tempdir().unwrap();
    let config = fast_config(dir.path());
    let pipeline = Pipeline::from_config(&config).unwrap();

    let result = pipeline
        .execute(&[format!("{base}/feed")], &config.output_dir)
        .await
        .unwrap();

    assert_eq!(result.articles.len(), 2);
    assert_eq!(result.log.count_matching("Successfully parsed article"), 2);
    assert_eq!(result.log.count_matching("before retry"), 0);
    assert_eq!(result.log.count_matching("Found 2 articles"), 1);
    assert_eq!(result.log.count_matching("Processing article 1/2"), 1);
    assert_eq!(result.log.count_matching("Processing article 2/2"), 1);

    let file_name = result
        .output_path
        .file_name()
        .unwrap()
        .to_string_lossy()
        .into_owned();
    assert_eq!(
        result.log.messages().last().unwrap(),
        format!("Scraping completed. Total articles: 2. Output saved to {file_name}")
    );

    let text = std::fs::read_to_string(&result.output_path).unwrap();
    assert_eq!(
        parse_blocks(&text),
        vec![
            (
                first,
                "The first story has enough paragraph text to clear the floor.".to_string()
            ),
            (
                second,
                "The second story also has enough paragraph text to be kept.".to_string()
            ),
        ]
    );
}

// ============================================================================
// Partial failure
// ============================================================================

#[tokio::test]
async fn test_failing_feed_exhausts_retries_and_run_continues() {
    let server = MockServer::start().await;
    let base = server.uri();
    let broken = format!("{base}/broken-feed");
    let story = format!("{base}/story");

    Mock::given(method("GET"))
        .and(path("/broken-feed"))
        .respond_with(ResponseTemplate::new(500))
        .expect(3)
        .mount(&server)
        .await;
    mount_get(&server, "/good-feed", 200, rss(&[story.clone()])).await;
    mount_get(
        &server,
        "/story",
        200,
        article_page("A perfectly ordinary story with plenty of readable text in it."),
    )
    .await;

    let dir = tempfile::tempdir().unwrap();
    let pipeline = Pipeline::from_config(&fast_config(dir.path())).unwrap();

    let result = pipeline
        .execute(&[broken.clone(), format!("{base}/good-feed")], dir.path())
        .await
        .unwrap();

    assert_eq!(result.log.count_matching(&format!(" - GET {broken}")), 3);
    assert_eq!(result.log.count_matching("HTTP status 500"), 3);
    assert_eq!(
        result
            .log
            .count_matching(&format!("Giving up on RSS {broken} after 3 attempts.")),
        1
    );
    assert_eq!(result.log.count_matching(&format!("Found 0 articles from {broken}")), 0);

    assert_eq!(result.articles.len(), 1);
    assert_eq!(result.articles[0].url(), story);
}

#[tokio::test]
async fn test_short_article_dropped_after_every_attempt() {
    let server = MockServer::start().await;
    let base = server.uri();
    let paywalled = format!("{base}/paywalled");
    let open = format!("{base}/open");

    mount_get(&server, "/feed", 200, rss(&[paywalled.clone(), open.clone()])).await;
    Mock::given(method("GET"))
        .and(path("/paywalled"))
        .respond_with(ResponseTemplate::new(200).set_body_string(article_page(
            "Subscribe to continue reading.",
        )))
        .expect(3)
        .mount(&server)
        .await;
    mount_get(
        &server,
        "/open",
        200,
        article_page("This one is free to read and has more than fifty characters."),
    )
    .await;

    let dir = tempfile::tempdir().unwrap();
    let pipeline = Pipeline::from_config(&fast_config(dir.path())).unwrap();

    let result = pipeline
        .execute(&[format!("{base}/feed")], dir.path())
        .await
        .unwrap();

    assert_eq!(result.log.count_matching("Content too short (30 chars"), 3);
    assert_eq!(
        result
            .log
            .count_matching(&format!("Giving up on article {paywalled} after 3 attempts.")),
        1
    );

    let urls: Vec<&str> = result.articles.iter().map(|a| a.url()).collect();
    assert_eq!(urls, vec![open.as_str()]);

    let text = std::fs::read_to_string(&result.output_path).unwrap();
    assert!(!text.contains(&paywalled));
}

// ============================================================================
// Empty results
// ============================================================================

#[tokio::test]
async fn test_no_articles_writes_marker_file() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_get(&server, "/empty", 200, rss(&[])).await;
    mount_get(
        &server,
        "/no-links",
        200,
        "<rss><channel><item><title>x</title></item></channel></rss>".to_string(),
    )
    .await;

    let dir = tempfile::tempdir().unwrap();
    let pipeline = Pipeline::from_config(&fast_config(dir.path())).unwrap();

    let result = pipeline
        .execute(&[format!("{base}/empty"), format!("{base}/no-links")], dir.path())
        .await
        .unwrap();

    assert!(result.articles.is_empty());
    assert_eq!(result.log.count_matching("Found 0 articles"), 2);
    assert_eq!(result.log.count_matching("Processing article"), 0);
    assert_eq!(
        result.log.messages().last(),
        Some("No articles found from the selected RSS sources.")
    );
    assert_eq!(
        std::fs::read_to_string(&result.output_path).unwrap(),
        "No articles found."
    );
}

#[tokio::test]
async fn test_consecutive_runs_write_separate_files() {
    let dir = tempfile::tempdir().unwrap();
    let pipeline = Pipeline::from_config(&fast_config(dir.path())).unwrap();

    let first = pipeline.execute(&[], dir.path()).await.unwrap();
    let second = pipeline.execute(&[], dir.path()).await.unwrap();

    assert_ne!(first.output_path, second.output_path);
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 2);
}

// ============================================================================
// Ordering
// ============================================================================

#[tokio::test]
async fn test_articles_keep_feed_then_document_order() {
    let server = MockServer::start().await;
    let base = server.uri();

    let feed_a: Vec<String> = (1..=3).map(|n| format!("{base}/a/{n}")).collect();
    let feed_b: Vec<String> = (1..=2).map(|n| format!("{base}/b/{n}")).collect();

    mount_get(&server, "/feed-a", 200, rss(&feed_a)).await;
    mount_get(&server, "/feed-b", 200, rss(&feed_b)).await;
    for url in feed_a.iter().chain(&feed_b) {
        let route = url.trim_start_matches(base.as_str()).to_string();
        mount_get(
            &server,
            &route,
            200,
            article_page(&format!("Body of {route} padded out to pass the minimum length check.")),
        )
        .await;
    }

    let dir = tempfile::tempdir().unwrap();
    let pipeline = Pipeline::from_config(&fast_config(dir.path())).unwrap();
    let result = pipeline
        .execute(&[format!("{base}/feed-a"), format!("{base}/feed-b")], dir.path())
        .await
        .unwrap();

    let expected: Vec<String> = feed_a.iter().chain(&feed_b).cloned().collect();
    let written: Vec<String> = parse_blocks(&std::fs::read_to_string(&result.output_path).unwrap())
        .into_iter()
        .map(|(url, _)| url)
        .collect();
    assert_eq!(written, expected);
    // Two pauses inside feed A, one inside feed B
    assert_eq!(result.log.count_matching("seconds before next article"), 3);
}

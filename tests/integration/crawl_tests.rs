//! Integration tests for the crawler
//!
//! These tests use wiremock to serve a small news portal and drive the
//! full crawl cycle end-to-end through the plain HTTP fetcher.

use market_news_crawler::config::{
    BrowserConfig, Config, CrawlerConfig, ExtractConfig, FetcherMode, LinkConfig, OutputConfig,
    StorageBackend,
};
use market_news_crawler::crawler::crawl;
use market_news_crawler::storage::{open_dataset, COLUMNS};
use market_news_crawler::CrawlerError;
use std::path::Path;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const LISTING_PATH: &str = "/thi-truong-chung-khoan.chn";

/// Creates a test configuration pointing at the mock portal
fn create_test_config(
    base_url: &str,
    page_count: u32,
    dir: &Path,
    backend: StorageBackend,
) -> Config {
    let dataset = match backend {
        StorageBackend::Csv => dir.join("news.csv"),
        StorageBackend::Sqlite => dir.join("news.db"),
    };

    Config {
        crawler: CrawlerConfig {
            listing_url: format!("{}{}", base_url, LISTING_PATH),
            page_count,
            page_url_template: "{listing}/trang-{page}.chn".to_string(),
            listing_settle_ms: 0,
            article_settle_ms: 0,
        },
        links: LinkConfig::default(),
        extract: ExtractConfig::default(),
        browser: BrowserConfig {
            mode: FetcherMode::Http,
            navigation_timeout_ms: 5_000,
            ..BrowserConfig::default()
        },
        output: OutputConfig {
            backend,
            dataset_path: dataset.to_string_lossy().into_owned(),
            log_path: dir.join("crawl.log").to_string_lossy().into_owned(),
        },
    }
}

fn article_path(n: u32) -> String {
    format!("/co-phieu-tin-{}-18824050100000{}.chn", n, n)
}

fn listing_html(articles: &[u32]) -> String {
    let anchors: String = articles
        .iter()
        .map(|n| format!(r#"<a href="{}">Tin {}</a>"#, article_path(*n), n))
        .collect();
    format!(
        r#"<html><body>
        <a href="/gioi-thieu.chn">About</a>
        <a href="https://other.example/tin-188240501000009.chn">External</a>
        {}
        </body></html>"#,
        anchors
    )
}

fn article_html(n: u32, title: &str) -> String {
    format!(
        r#"<html><body>
        <h1>{}</h1>
        <div class="contentdetail"><p>Đoạn {}</p><script>track()</script></div>
        </body></html>"#,
        title, n
    )
}

async fn mount_page(server: &MockServer, page_path: &str, status: u16, body: String) {
    Mock::given(method("GET"))
        .and(path(page_path))
        .respond_with(
            ResponseTemplate::new(status)
                .set_body_string(body)
                .insert_header("content-type", "text/html; charset=utf-8"),
        )
        .mount(server)
        .await;
}

fn read_csv(dir: &Path) -> Vec<Vec<String>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .from_path(dir.join("news.csv"))
        .expect("Failed to open dataset");
    reader
        .records()
        .map(|r| r.expect("Bad row").iter().map(str::to_string).collect())
        .collect()
}

#[tokio::test]
async fn test_full_crawl_two_listing_pages() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    // Article 2 appears on both pages and is only fetched once
    mount_page(&server, LISTING_PATH, 200, listing_html(&[1, 2])).await;
    mount_page(
        &server,
        &format!("{}/trang-2.chn", LISTING_PATH),
        200,
        listing_html(&[2, 3]),
    )
    .await;
    for n in 1..=3 {
        mount_page(&server, &article_path(n), 200, article_html(n, &format!("Tin {}", n))).await;
    }

    let config = create_test_config(&server.uri(), 2, dir.path(), StorageBackend::Csv);
    let summary = crawl(config).await.expect("Crawl failed");

    assert_eq!(summary.links_discovered, 3);
    assert_eq!(summary.articles_extracted, 3);
    assert_eq!(summary.articles_failed(), 0);
    assert_eq!(summary.records_written, 3);

    let rows = read_csv(dir.path());
    assert_eq!(rows[0], COLUMNS.to_vec());
    assert_eq!(rows.len(), 4);

    let first = &rows[1];
    assert_eq!(first[1], "Tin 1");
    assert_eq!(first[2], format!("{}{}", server.uri(), article_path(1)));
    assert_eq!(first[3], "Đoạn 1");
    assert_eq!(first[0].len(), "2024-05-01 08:00:00".len());

    let urls: Vec<_> = rows[1..].iter().map(|r| r[2].clone()).collect();
    let expected: Vec<_> = (1..=3)
        .map(|n| format!("{}{}", server.uri(), article_path(n)))
        .collect();
    assert_eq!(urls, expected);
}

#[tokio::test]
async fn test_failing_article_is_skipped() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_page(&server, LISTING_PATH, 200, listing_html(&[1, 2, 3])).await;
    mount_page(&server, &article_path(1), 200, article_html(1, "Tin 1")).await;
    mount_page(&server, &article_path(2), 500, "Internal error".to_string()).await;
    mount_page(&server, &article_path(3), 200, article_html(3, "Tin 3")).await;

    let config = create_test_config(&server.uri(), 1, dir.path(), StorageBackend::Csv);
    let summary = crawl(config).await.expect("Crawl failed");

    assert_eq!(summary.links_discovered, 3);
    assert_eq!(summary.articles_extracted, 2);
    assert_eq!(summary.articles_failed(), 1);
    assert_eq!(
        summary.failures[0].url,
        format!("{}{}", server.uri(), article_path(2))
    );

    let rows = read_csv(dir.path());
    assert_eq!(rows.len(), 3);
    assert!(rows.iter().all(|r| !r[2].ends_with(&article_path(2))));
}

#[tokio::test]
async fn test_no_links_leaves_dataset_untouched() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_page(&server, LISTING_PATH, 200, listing_html(&[1])).await;
    mount_page(&server, &article_path(1), 200, article_html(1, "Tin 1")).await;

    let config = create_test_config(&server.uri(), 1, dir.path(), StorageBackend::Csv);
    crawl(config.clone()).await.expect("First crawl failed");
    let before = std::fs::read(dir.path().join("news.csv")).unwrap();

    server.reset().await;
    mount_page(&server, LISTING_PATH, 200, listing_html(&[])).await;

    let summary = crawl(config).await.expect("Second crawl failed");

    assert_eq!(summary.links_discovered, 0);
    assert_eq!(summary.records_written, 1);
    assert_eq!(std::fs::read(dir.path().join("news.csv")).unwrap(), before);
}

#[tokio::test]
async fn test_rerun_replaces_records_by_url() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_page(&server, LISTING_PATH, 200, listing_html(&[1, 2])).await;
    mount_page(&server, &article_path(1), 200, article_html(1, "Tin 1")).await;
    mount_page(&server, &article_path(2), 200, article_html(2, "Tin 2")).await;

    let config = create_test_config(&server.uri(), 1, dir.path(), StorageBackend::Csv);
    crawl(config.clone()).await.expect("First crawl failed");

    server.reset().await;
    mount_page(&server, LISTING_PATH, 200, listing_html(&[2, 3])).await;
    mount_page(&server, &article_path(2), 200, article_html(2, "Tin 2 cập nhật")).await;
    mount_page(&server, &article_path(3), 200, article_html(3, "Tin 3")).await;

    let summary = crawl(config).await.expect("Second crawl failed");
    assert_eq!(summary.records_written, 3);

    let rows = read_csv(dir.path());
    let titles: Vec<_> = rows[1..].iter().map(|r| r[1].as_str()).collect();
    assert_eq!(titles, vec!["Tin 1", "Tin 2 cập nhật", "Tin 3"]);
}

#[tokio::test]
async fn test_listing_failure_aborts_without_writing() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_page(&server, LISTING_PATH, 200, listing_html(&[1])).await;
    mount_page(
        &server,
        &format!("{}/trang-2.chn", LISTING_PATH),
        503,
        "Unavailable".to_string(),
    )
    .await;
    mount_page(&server, &article_path(1), 200, article_html(1, "Tin 1")).await;

    let config = create_test_config(&server.uri(), 2, dir.path(), StorageBackend::Csv);
    let result = crawl(config).await;

    assert!(matches!(result, Err(CrawlerError::Fetch(_))));
    assert!(!dir.path().join("news.csv").exists());
}

#[tokio::test]
async fn test_corrupt_dataset_aborts_before_fetching() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("news.csv"), "id,name\n1,x\n").unwrap();

    mount_page(&server, LISTING_PATH, 200, listing_html(&[1])).await;

    let config = create_test_config(&server.uri(), 1, dir.path(), StorageBackend::Csv);
    let result = crawl(config).await;

    assert!(matches!(result, Err(CrawlerError::Dataset(_))));
    let requests = server.received_requests().await.unwrap_or_default();
    assert!(requests.is_empty());
}

#[tokio::test]
async fn test_sqlite_backend() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_page(&server, LISTING_PATH, 200, listing_html(&[1, 2])).await;
    mount_page(&server, &article_path(1), 200, article_html(1, "Tin 1")).await;
    mount_page(&server, &article_path(2), 200, article_html(2, "Tin 2")).await;

    let config = create_test_config(&server.uri(), 1, dir.path(), StorageBackend::Sqlite);
    let summary = crawl(config.clone()).await.expect("Crawl failed");
    assert_eq!(summary.records_written, 2);

    let store = open_dataset(&config.output).unwrap();
    let dataset = store.load().unwrap();
    let titles: Vec<_> = dataset.iter().map(|r| r.title.as_str()).collect();
    assert_eq!(titles, vec!["Tin 1", "Tin 2"]);
}

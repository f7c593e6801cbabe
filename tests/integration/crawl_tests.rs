//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full crawl cycle end-to-end through real HTTP browsing contexts.

use catalog_crawler::config::Config;
use catalog_crawler::crawler::crawl;
use catalog_crawler::output::UTF8_BOM;
use std::path::Path;
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration pointed at `base_url`, writing into `dir`
fn create_test_config(base_url: &str, dir: &Path) -> Config {
    let mut config = Config::default();
    config.site.base_url = base_url.to_string();
    config.output.csv_path = dir.join("categories.csv").display().to_string();
    config.session.auth_path = dir.join("auth.json").display().to_string();

    // Very short for testing
    config.timing.navigation_timeout_ms = 2000;
    config.timing.home_settle_timeout_ms = 0;
    config.timing.settle_timeout_ms = 0;
    config.timing.poll_interval_ms = 10;
    config.timing.min_request_interval_ms = 0;
    config
}

fn menu(links: &[(&str, &str)]) -> String {
    let items: String = links
        .iter()
        .map(|(name, href)| {
            format!(
                r#"<div class="category-item-header"><h2><a href="{}">{}</a></h2></div>"#,
                href, name
            )
        })
        .collect();
    format!("<html><body>{}</body></html>", items)
}

fn products(names: &[&str]) -> String {
    let items: String = names
        .iter()
        .map(|name| format!(r#"<li><a href="/p/{}">{}</a></li>"#, name, name))
        .collect();
    format!(
        r#"<html><body><div class="link-list-column"><ul class="link-list link-primary">{}</ul></div></body></html>"#,
        items
    )
}

async fn mount_page(server: &MockServer, route: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

fn read_csv(path: &str) -> String {
    let bytes = std::fs::read(path).expect("CSV file should exist");
    assert!(bytes.starts_with(UTF8_BOM), "CSV must start with a BOM");
    String::from_utf8(bytes[UTF8_BOM.len()..].to_vec()).expect("CSV must be UTF-8")
}

#[tokio::test]
async fn test_full_crawl_writes_csv() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let dir = TempDir::new().unwrap();

    mount_page(&mock_server, "/", menu(&[("Freinage", "/freinage"), ("Filtration", "/filtration")])).await;
    mount_page(
        &mock_server,
        "/freinage",
        menu(&[("Disques", "/freinage/disques"), ("Plaquettes", "/freinage/plaquettes")]),
    )
    .await;
    mount_page(&mock_server, "/filtration", menu(&[("Filtre à huile", "/filtration/huile")])).await;
    mount_page(&mock_server, "/freinage/disques", products(&["Disque avant", "Disque arrière"])).await;
    mount_page(&mock_server, "/freinage/plaquettes", products(&[])).await;
    mount_page(&mock_server, "/filtration/huile", products(&["Filtre"])).await;

    let config = create_test_config(&base_url, dir.path());
    let report = crawl(&config).await.expect("Crawl should succeed");

    assert!(report.failures.is_empty());
    assert_eq!(report.statistics.categories_found, 2);
    assert_eq!(report.statistics.records, 3);
    assert_eq!(report.statistics.empty_subcategories, 1);

    let csv = read_csv(&config.output.csv_path);
    let lines: Vec<_> = csv.lines().collect();
    assert_eq!(lines[0], "Category,Sub-category,Link,Products");
    assert_eq!(
        lines[1],
        format!(
            "Freinage,Disques,{}/freinage/disques,\"Disque avant, Disque arrière\"",
            base_url
        )
    );
    assert_eq!(
        lines[2],
        format!("Freinage,Plaquettes,{}/freinage/plaquettes,no product found", base_url)
    );
    assert_eq!(
        lines[3],
        format!("Filtration,Filtre à huile,{}/filtration/huile,Filtre", base_url)
    );
    assert_eq!(lines.len(), 4);
}

#[tokio::test]
async fn test_session_cookie_sent_on_first_navigation() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let dir = TempDir::new().unwrap();

    let auth = format!(
        r#"{{"origins": [{{"origin": "{}", "localStorage": [{{"name": "token", "value": "abc"}}]}}]}}"#,
        base_url
    );
    std::fs::write(dir.path().join("auth.json"), auth).unwrap();

    // The home page only answers authenticated requests
    Mock::given(method("GET"))
        .and(path("/"))
        .and(header("cookie", "token=abc"))
        .respond_with(ResponseTemplate::new(200).set_body_string(menu(&[("A", "/a")])))
        .expect(1)
        .mount(&mock_server)
        .await;
    mount_page(&mock_server, "/a", menu(&[("A1", "/a/1")])).await;
    mount_page(&mock_server, "/a/1", products(&["p"])).await;

    let config = create_test_config(&base_url, dir.path());
    let report = crawl(&config).await.expect("Crawl should succeed");

    assert!(report.failures.is_empty(), "failures: {:?}", report.failures);
    assert_eq!(report.statistics.records, 1);
}

#[tokio::test]
async fn test_missing_session_file_crawls_unauthenticated() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let dir = TempDir::new().unwrap();

    mount_page(&mock_server, "/", menu(&[("A", "/a")])).await;
    mount_page(&mock_server, "/a", menu(&[("A1", "/a/1")])).await;
    mount_page(&mock_server, "/a/1", products(&["p"])).await;

    let config = create_test_config(&base_url, dir.path());
    let report = crawl(&config).await.expect("Crawl should succeed");

    assert_eq!(report.statistics.records, 1);
}

#[tokio::test]
async fn test_failing_branch_is_isolated() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let dir = TempDir::new().unwrap();

    mount_page(&mock_server, "/", menu(&[("A", "/a"), ("B", "/b")])).await;
    mount_page(&mock_server, "/a", menu(&[("A1", "/a/1")])).await;
    mount_page(&mock_server, "/a/1", products(&["p1", "p2", "p3"])).await;
    // No mock for /b: wiremock answers 404

    let config = create_test_config(&base_url, dir.path());
    let report = crawl(&config).await.expect("Crawl should succeed");

    assert_eq!(report.statistics.records, 1);
    assert_eq!(report.statistics.categories_failed, 1);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].name, "B");
    assert!(report.failures[0].error.contains("404"));

    let csv = read_csv(&config.output.csv_path);
    assert_eq!(csv.lines().count(), 2);
    assert!(csv.contains("\"p1, p2, p3\""));
}

#[tokio::test]
async fn test_failed_reload_keeps_loaded_page() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let dir = TempDir::new().unwrap();

    mount_page(&mock_server, "/", menu(&[("A", "/a")])).await;
    mount_page(&mock_server, "/a", menu(&[("A1", "/a/1")])).await;
    // First load succeeds without products, every reload is refused
    Mock::given(method("GET"))
        .and(path("/a/1"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html><body>none</body></html>"))
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/a/1"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    let mut config = create_test_config(&base_url, dir.path());
    config.timing.settle_timeout_ms = 200;

    let report = crawl(&config).await.expect("Crawl should succeed");

    assert!(report.failures.is_empty(), "failures: {:?}", report.failures);
    assert_eq!(report.statistics.records, 1);

    let csv = read_csv(&config.output.csv_path);
    assert!(csv.contains("A,A1,"));
    assert!(csv.trim_end().ends_with("no product found"));
}

#[tokio::test]
async fn test_navigation_timeout_skips_node() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let dir = TempDir::new().unwrap();

    mount_page(&mock_server, "/", menu(&[("Slow", "/slow"), ("Fast", "/fast")])).await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(menu(&[("S1", "/slow/1")]))
                .set_delay(Duration::from_millis(1500)),
        )
        .mount(&mock_server)
        .await;
    mount_page(&mock_server, "/fast", menu(&[("F1", "/fast/1")])).await;
    mount_page(&mock_server, "/fast/1", products(&["f"])).await;

    let mut config = create_test_config(&base_url, dir.path());
    config.timing.navigation_timeout_ms = 300;

    let report = crawl(&config).await.expect("Crawl should succeed");

    assert_eq!(report.statistics.records, 1);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].name, "Slow");
    assert!(report.failures[0].error.contains("timeout"));
}

#[tokio::test]
async fn test_concurrent_crawl_keeps_category_order() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let dir = TempDir::new().unwrap();

    mount_page(&mock_server, "/", menu(&[("A", "/a"), ("B", "/b"), ("C", "/c")])).await;
    for name in ["a", "b", "c"] {
        mount_page(&mock_server, &format!("/{}", name), menu(&[("Sub", &format!("/{}/1", name))])).await;
        mount_page(&mock_server, &format!("/{}/1", name), products(&[name])).await;
    }

    let mut config = create_test_config(&base_url, dir.path());
    config.crawler.max_branch_concurrency = 3;

    let report = crawl(&config).await.expect("Crawl should succeed");
    assert_eq!(report.statistics.records, 3);

    let csv = read_csv(&config.output.csv_path);
    let categories: Vec<_> = csv
        .lines()
        .skip(1)
        .map(|line| line.split(',').next().unwrap().to_string())
        .collect();
    assert_eq!(categories, vec!["A", "B", "C"]);
}

#[tokio::test]
async fn test_no_records_writes_no_file() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let dir = TempDir::new().unwrap();

    mount_page(&mock_server, "/", "<html><body>Maintenance</body></html>".to_string()).await;

    let config = create_test_config(&base_url, dir.path());
    let report = crawl(&config).await.expect("Crawl should succeed");

    assert_eq!(report.statistics.categories_found, 0);
    assert!(!Path::new(&config.output.csv_path).exists());
}

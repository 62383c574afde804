//! Occurrence scanning against a local mock server.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use std::sync::Arc;

use serpsift::serp_scrape::transport::PlainFetcher;
use serpsift::serp_scrape::{Classification, ResultEntry, ScrapeConfig, SearchBatch, SearchEngine};
use serpsift::{MemoryStore, OccurrenceScanner, ResultStore, ScanReport, SerpError};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const MOCK_RUST_HTML: &str =
    "<html><body><h1>Rust</h1><p>Why rust? Because RUST. Not rusty.</p></body></html>";
const MOCK_EMPTY_HTML: &str = "<html><body><p>Nothing relevant here.</p></body></html>";
const MOCK_GO_HTML: &str = "<html><body><p>Go, go, go!</p></body></html>";

fn fetcher() -> PlainFetcher {
    let config = ScrapeConfig {
        plain_delay_ms: (0, 0),
        plain_timeout_seconds: 2,
        ..Default::default()
    };
    PlainFetcher::new(&config).expect("client")
}

async fn mock_site() -> MockServer {
    let server = MockServer::start().await;
    for (route, body) in [("/rust", MOCK_RUST_HTML), ("/empty", MOCK_EMPTY_HTML), ("/go", MOCK_GO_HTML)] {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .mount(&server)
            .await;
    }
    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    server
}

fn batch(term: &str, links: &[(String, Classification)]) -> SearchBatch {
    let mut batch = SearchBatch::new(term);
    let entries = links
        .iter()
        .map(|(link, class)| {
            ResultEntry::new(SearchEngine::DuckDuckGo, "Title", link.as_str(), "", *class).unwrap()
        })
        .collect();
    batch.insert(SearchEngine::DuckDuckGo, entries);
    batch
}

async fn seeded_store(server: &MockServer) -> Arc<MemoryStore> {
    let store = Arc::new(MemoryStore::new(3_600));
    let uri = server.uri();
    store
        .persist_results(
            "rust",
            &batch(
                "rust",
                &[
                    (format!("{uri}/rust"), Classification::Organic),
                    (format!("{uri}/broken"), Classification::Organic),
                    (format!("{uri}/empty"), Classification::Organic),
                    (format!("{uri}/ad"), Classification::Advertisement),
                ],
            ),
        )
        .await
        .unwrap();
    store
        .persist_results("go", &batch("go", &[(format!("{uri}/go"), Classification::Organic)]))
        .await
        .unwrap();
    store
}

#[tokio::test]
async fn failing_rows_are_skipped_and_the_rest_recorded() {
    let server = mock_site().await;
    let store = seeded_store(&server).await;
    let scanner = OccurrenceScanner::new(store.clone(), fetcher());

    let report = scanner.scan_pending(Some("rust")).await.unwrap();
    assert_eq!(
        report,
        ScanReport {
            scanned: 2,
            failed: 1,
            occurrences: 3,
        }
    );

    let pending: Vec<_> = store
        .pending_rows(None)
        .await
        .unwrap()
        .into_iter()
        .map(|r| r.link)
        .collect();
    assert_eq!(
        pending,
        [format!("{}/broken", server.uri()), format!("{}/go", server.uri())]
    );

    let rust = store
        .fetch_stored_entry(&format!("{}/rust", server.uri()))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(rust.occurrences, Some(3));
    assert!(rust.scanned_at.is_some());
}

#[tokio::test]
async fn unfiltered_scan_counts_each_rows_own_term() {
    let server = mock_site().await;
    let store = seeded_store(&server).await;
    let scanner = OccurrenceScanner::new(store.clone(), fetcher());

    scanner.scan_pending(None).await.unwrap();
    let go = store
        .fetch_stored_entry(&format!("{}/go", server.uri()))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(go.occurrences, Some(3));
}

#[tokio::test]
async fn count_for_url_finds_the_row_by_normalised_link() {
    let server = mock_site().await;
    let store = seeded_store(&server).await;
    let scanner = OccurrenceScanner::new(store, fetcher());

    let count = scanner
        .count_for_url(&format!("{}/rust/?utm_source=x#frag", server.uri()))
        .await
        .unwrap();
    assert_eq!(count, 3);
}

#[tokio::test]
async fn count_for_url_reports_missing_rows() {
    let server = mock_site().await;
    let store = seeded_store(&server).await;
    let scanner = OccurrenceScanner::new(store, fetcher());

    let err = scanner
        .count_for_url("https://never-stored.example/")
        .await
        .unwrap_err();
    assert!(matches!(err, SerpError::NotFound(_)));
}

#[tokio::test]
async fn count_for_url_surfaces_fetch_errors() {
    let server = mock_site().await;
    let store = seeded_store(&server).await;
    let scanner = OccurrenceScanner::new(store, fetcher());

    let err = scanner
        .count_for_url(&format!("{}/broken", server.uri()))
        .await
        .unwrap_err();
    assert!(matches!(err, SerpError::Scrape(_)));
}

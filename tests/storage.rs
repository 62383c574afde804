//! Storage boundary behaviour: upsert buckets, latest-bucket queries,
//! per-engine counts and stored-entry lookup.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use chrono::{DateTime, TimeZone, Utc};
use serpsift::storage::EngineCounts;
use serpsift::serp_scrape::{Classification, ResultEntry, SearchBatch, SearchEngine};
use serpsift::{MemoryStore, ResultStore};

const HOUR: u64 = 3_600;

fn at(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(secs, 0).unwrap()
}

fn entry(engine: SearchEngine, link: &str, class: Classification) -> ResultEntry {
    ResultEntry::new(engine, format!("Title for {link}"), link, "desc", class).unwrap()
}

fn sample_batch() -> SearchBatch {
    let mut batch = SearchBatch::new("rust");
    batch.insert(
        SearchEngine::Google,
        vec![
            entry(SearchEngine::Google, "https://ad.example/", Classification::Advertisement),
            entry(SearchEngine::Google, "https://rust-lang.org/", Classification::Organic),
            entry(SearchEngine::Google, "https://docs.rs/", Classification::Organic),
        ],
    );
    batch.insert(
        SearchEngine::Bing,
        vec![
            entry(SearchEngine::Bing, "https://rust-lang.org/", Classification::Organic),
            entry(SearchEngine::Bing, "https://panel.example/", Classification::Promotional),
        ],
    );
    batch.insert(SearchEngine::Yahoo, Vec::new());
    batch
}

#[test]
fn persisting_twice_in_one_bucket_is_idempotent() {
    let store = MemoryStore::new(HOUR);
    let first = store.persist_at("rust", &sample_batch(), at(100));
    let again = store.persist_at("rust", &sample_batch(), at(200));
    assert_eq!(first.inserted, 5);
    assert_eq!(again.inserted, 0);
    assert_eq!(again.updated, 5);
    assert_eq!(store.len(), 5);
}

#[test]
fn a_new_bucket_adds_new_rows() {
    let store = MemoryStore::new(HOUR);
    store.persist_at("rust", &sample_batch(), at(100));
    let later = store.persist_at("rust", &sample_batch(), at(100 + HOUR as i64));
    assert_eq!(later.inserted, 5);
    assert_eq!(store.len(), 10);
}

#[tokio::test]
async fn latest_rows_come_from_each_engines_newest_bucket() {
    let store = MemoryStore::new(HOUR);
    store.persist_at("rust", &sample_batch(), at(0));

    let mut newer = SearchBatch::new("rust");
    newer.insert(
        SearchEngine::Bing,
        vec![entry(SearchEngine::Bing, "https://blog.example/", Classification::Organic)],
    );
    store.persist_at("rust", &newer, at(2 * HOUR as i64));

    let rows = store.latest_for_term("RUST").await.unwrap();
    let summary: Vec<_> = rows.iter().map(|r| (r.engine, r.link.as_str())).collect();
    assert_eq!(
        summary,
        [
            (SearchEngine::Google, "https://ad.example/"),
            (SearchEngine::Google, "https://rust-lang.org/"),
            (SearchEngine::Google, "https://docs.rs/"),
            (SearchEngine::Bing, "https://blog.example/"),
        ]
    );
}

#[tokio::test]
async fn latest_rows_order_by_occurrences_within_an_engine() {
    let store = MemoryStore::new(HOUR);
    store.persist_at("rust", &sample_batch(), at(0));

    let docs = store.fetch_stored_entry("https://docs.rs").await.unwrap().unwrap();
    store.record_occurrences(docs.id, 9, at(10)).await.unwrap();
    let google_rust = store
        .latest_for_term("rust")
        .await
        .unwrap()
        .into_iter()
        .find(|r| r.engine == SearchEngine::Google && r.link == "https://rust-lang.org/")
        .unwrap();
    store.record_occurrences(google_rust.id, 2, at(10)).await.unwrap();

    let google: Vec<_> = store
        .latest_for_term("rust")
        .await
        .unwrap()
        .into_iter()
        .filter(|r| r.engine == SearchEngine::Google)
        .map(|r| (r.link, r.occurrences))
        .collect();
    assert_eq!(
        google,
        [
            ("https://docs.rs/".to_owned(), Some(9)),
            ("https://rust-lang.org/".to_owned(), Some(2)),
            ("https://ad.example/".to_owned(), None),
        ]
    );
}

#[tokio::test]
async fn counts_split_organic_and_non_organic_per_engine() {
    let store = MemoryStore::new(HOUR);
    store.persist_at("rust", &sample_batch(), at(0));
    let counts = store.classification_counts("rust").await.unwrap();
    assert_eq!(
        counts,
        [
            EngineCounts {
                engine: SearchEngine::Google,
                organic: 2,
                non_organic: 1,
            },
            EngineCounts {
                engine: SearchEngine::Bing,
                organic: 1,
                non_organic: 1,
            },
        ]
    );
    assert!(store.classification_counts("golang").await.unwrap().is_empty());
}

#[tokio::test]
async fn stored_entry_lookup_uses_the_normalised_link() {
    let store = MemoryStore::new(HOUR);
    store.persist_at("rust", &sample_batch(), at(0));

    let row = store
        .fetch_stored_entry("https://Rust-Lang.org/?utm_source=feed#top")
        .await
        .unwrap()
        .expect("stored");
    assert_eq!(row.link, "https://rust-lang.org/");
    assert!(store.fetch_stored_entry("https://missing.example/").await.unwrap().is_none());
}

#[tokio::test]
async fn pending_rows_filter_by_term() {
    let store = MemoryStore::new(HOUR);
    store.persist_at("rust", &sample_batch(), at(0));
    let mut go = SearchBatch::new("go");
    go.insert(
        SearchEngine::DuckDuckGo,
        vec![entry(SearchEngine::DuckDuckGo, "https://go.dev/", Classification::Organic)],
    );
    store.persist_at("go", &go, at(0));

    assert_eq!(store.pending_rows(None).await.unwrap().len(), 4);
    let go_rows = store.pending_rows(Some(" Go ")).await.unwrap();
    assert_eq!(go_rows.len(), 1);
    assert_eq!(go_rows[0].search_term, "go");
}

#[tokio::test]
async fn links_on_different_ports_are_distinct_rows() {
    let store = MemoryStore::new(HOUR);
    let mut batch = SearchBatch::new("rust");
    batch.insert(
        SearchEngine::Bing,
        vec![
            entry(SearchEngine::Bing, "https://h.example/a", Classification::Organic),
            entry(SearchEngine::Bing, "https://h.example:8443/a", Classification::Advertisement),
        ],
    );
    let summary = store.persist_at("rust", &batch, at(0));
    assert_eq!(summary.inserted, 2);

    let row = store
        .fetch_stored_entry("https://h.example:8443/a")
        .await
        .unwrap()
        .expect("stored");
    assert_eq!(row.link, "https://h.example:8443/a");
    assert_eq!(row.classification, Classification::Advertisement);
}

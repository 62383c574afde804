//! Storage boundary for scraped results.
//!
//! [`ResultStore`] is what the host persists batches through and what
//! occurrence scanning reads back from. [`MemoryStore`] keeps everything in
//! process; a database-backed store implements the same trait.
//!
//! Rows are upserted on `(engine, normalised link, search term, bucket)`,
//! where the bucket is the persist time rounded down to
//! `bucket_seconds`. Persisting the same batch twice within a bucket is a
//! no-op apart from refreshing title, description and classification.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serp_scrape::{Classification, SearchBatch, SearchEngine};

use crate::error::{Result, SerpError};
use crate::normalize::normalize_link;

/// One stored result entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PersistedRow {
    pub id: u64,
    pub search_term: String,
    pub engine: SearchEngine,
    pub base_url: String,
    pub title: String,
    /// The link as scraped.
    pub link: String,
    /// Upsert key component, see [`normalize_link`].
    pub normalized_link: String,
    pub description: String,
    pub classification: Classification,
    /// Start of the timestamp bucket, in Unix seconds.
    pub bucket: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Whole-word occurrences of `search_term` in the linked page, once scanned.
    pub occurrences: Option<u32>,
    pub scanned_at: Option<DateTime<Utc>>,
}

impl PersistedRow {
    /// Organic and not yet scanned for occurrences.
    pub fn is_pending(&self) -> bool {
        self.classification.is_organic() && self.scanned_at.is_none()
    }
}

/// What one [`ResultStore::persist_results`] call changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PersistSummary {
    pub inserted: usize,
    pub updated: usize,
}

/// Organic versus non-organic row counts for one engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EngineCounts {
    pub engine: SearchEngine,
    pub organic: usize,
    pub non_organic: usize,
}

/// Persistence for search batches and occurrence counts.
#[async_trait]
pub trait ResultStore: Send + Sync {
    /// Upsert every entry of `batch` under `search_term`.
    ///
    /// # Errors
    ///
    /// Returns [`SerpError::Storage`] on failure. Callers report it and do
    /// not retry.
    async fn persist_results(&self, search_term: &str, batch: &SearchBatch)
    -> Result<PersistSummary>;

    /// The most recently stored row whose normalised link matches `url`.
    async fn fetch_stored_entry(&self, url: &str) -> Result<Option<PersistedRow>>;

    /// Organic rows without an occurrence count, oldest first, optionally
    /// restricted to one search term (case-insensitive).
    async fn pending_rows(&self, search_term: Option<&str>) -> Result<Vec<PersistedRow>>;

    /// Store the occurrence count for row `id`.
    ///
    /// # Errors
    ///
    /// Returns [`SerpError::NotFound`] if no row has that id.
    async fn record_occurrences(&self, id: u64, count: u32, scanned_at: DateTime<Utc>)
    -> Result<()>;

    /// Rows from each engine's most recent bucket for `search_term`,
    /// ordered by engine, then occurrence count descending (unscanned last),
    /// then insertion order.
    async fn latest_for_term(&self, search_term: &str) -> Result<Vec<PersistedRow>>;

    /// Per-engine counts over [`latest_for_term`](Self::latest_for_term).
    async fn classification_counts(&self, search_term: &str) -> Result<Vec<EngineCounts>>;
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct UpsertKey {
    engine: SearchEngine,
    normalized_link: String,
    search_term: String,
    bucket: i64,
}

#[derive(Debug, Default)]
struct StoreInner {
    rows: Vec<PersistedRow>,
    index: HashMap<UpsertKey, usize>,
}

/// In-process [`ResultStore`].
#[derive(Debug)]
pub struct MemoryStore {
    bucket_seconds: i64,
    inner: Mutex<StoreInner>,
}

impl MemoryStore {
    /// A store bucketing persist times by `bucket_seconds` (minimum 1).
    pub fn new(bucket_seconds: u64) -> Self {
        Self {
            bucket_seconds: i64::try_from(bucket_seconds.max(1)).unwrap_or(i64::MAX),
            inner: Mutex::new(StoreInner::default()),
        }
    }

    /// Number of stored rows.
    pub fn len(&self) -> usize {
        self.lock().rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// [`ResultStore::persist_results`] with an explicit persist time.
    pub fn persist_at(&self, search_term: &str, batch: &SearchBatch, now: DateTime<Utc>) -> PersistSummary {
        let ts = now.timestamp();
        let bucket = ts - ts.rem_euclid(self.bucket_seconds);
        let term = search_term.trim().to_lowercase();
        let mut summary = PersistSummary::default();

        let mut inner = self.lock();
        for (engine, entries) in batch.iter() {
            for entry in entries {
                let key = UpsertKey {
                    engine,
                    normalized_link: normalize_link(entry.link()),
                    search_term: term.clone(),
                    bucket,
                };
                if let Some(&idx) = inner.index.get(&key) {
                    let row = &mut inner.rows[idx];
                    row.title = entry.title().to_owned();
                    row.description = entry.description().to_owned();
                    row.classification = entry.classification();
                    row.updated_at = now;
                    summary.updated += 1;
                    continue;
                }
                let idx = inner.rows.len();
                inner.rows.push(PersistedRow {
                    id: idx as u64 + 1,
                    search_term: term.clone(),
                    engine,
                    base_url: entry.base_url().to_owned(),
                    title: entry.title().to_owned(),
                    link: entry.link().to_owned(),
                    normalized_link: key.normalized_link.clone(),
                    description: entry.description().to_owned(),
                    classification: entry.classification(),
                    bucket,
                    created_at: now,
                    updated_at: now,
                    occurrences: None,
                    scanned_at: None,
                });
                inner.index.insert(key, idx);
                summary.inserted += 1;
            }
        }
        tracing::debug!(
            inserted = summary.inserted,
            updated = summary.updated,
            bucket,
            "batch persisted"
        );
        summary
    }

    fn latest(&self, search_term: &str) -> Vec<PersistedRow> {
        let term = search_term.trim().to_lowercase();
        let inner = self.lock();
        let mut newest: HashMap<SearchEngine, i64> = HashMap::new();
        for row in inner.rows.iter().filter(|r| r.search_term == term) {
            let bucket = newest.entry(row.engine).or_insert(row.bucket);
            *bucket = (*bucket).max(row.bucket);
        }
        let mut rows: Vec<PersistedRow> = inner
            .rows
            .iter()
            .filter(|r| r.search_term == term && newest.get(&r.engine) == Some(&r.bucket))
            .cloned()
            .collect();
        // `None` sorts below `Some`, so reversing puts unscanned rows last.
        rows.sort_by(|a, b| {
            a.engine
                .cmp(&b.engine)
                .then_with(|| b.occurrences.cmp(&a.occurrences))
                .then_with(|| a.id.cmp(&b.id))
        });
        rows
    }

    /// Rows are only touched under the lock, never across an await.
    fn lock(&self) -> MutexGuard<'_, StoreInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl ResultStore for MemoryStore {
    async fn persist_results(
        &self,
        search_term: &str,
        batch: &SearchBatch,
    ) -> Result<PersistSummary> {
        if search_term.trim().is_empty() {
            return Err(SerpError::Storage("search term is empty".into()));
        }
        Ok(self.persist_at(search_term, batch, Utc::now()))
    }

    async fn fetch_stored_entry(&self, url: &str) -> Result<Option<PersistedRow>> {
        let key = normalize_link(url);
        let inner = self.lock();
        Ok(inner
            .rows
            .iter()
            .filter(|r| r.normalized_link == key)
            .max_by_key(|r| (r.updated_at, r.id))
            .cloned())
    }

    async fn pending_rows(&self, search_term: Option<&str>) -> Result<Vec<PersistedRow>> {
        let term = search_term.map(|t| t.trim().to_lowercase());
        let inner = self.lock();
        Ok(inner
            .rows
            .iter()
            .filter(|r| r.is_pending())
            .filter(|r| term.as_ref().is_none_or(|t| &r.search_term == t))
            .cloned()
            .collect())
    }

    async fn record_occurrences(
        &self,
        id: u64,
        count: u32,
        scanned_at: DateTime<Utc>,
    ) -> Result<()> {
        let mut inner = self.lock();
        let row = inner
            .rows
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| SerpError::NotFound(format!("row {id}")))?;
        row.occurrences = Some(count);
        row.scanned_at = Some(scanned_at);
        Ok(())
    }

    async fn latest_for_term(&self, search_term: &str) -> Result<Vec<PersistedRow>> {
        Ok(self.latest(search_term))
    }

    async fn classification_counts(&self, search_term: &str) -> Result<Vec<EngineCounts>> {
        let mut counts: Vec<EngineCounts> = Vec::new();
        for row in self.latest(search_term) {
            let idx = match counts.iter().position(|c| c.engine == row.engine) {
                Some(idx) => idx,
                None => {
                    counts.push(EngineCounts {
                        engine: row.engine,
                        organic: 0,
                        non_organic: 0,
                    });
                    counts.len() - 1
                }
            };
            if row.classification.is_organic() {
                counts[idx].organic += 1;
            } else {
                counts[idx].non_organic += 1;
            }
        }
        Ok(counts)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

    use super::*;
    use chrono::TimeZone;
    use serp_scrape::ResultEntry;

    fn batch(engine: SearchEngine, links: &[(&str, Classification)]) -> SearchBatch {
        let mut batch = SearchBatch::new("rust");
        let entries = links
            .iter()
            .map(|(link, class)| ResultEntry::new(engine, "Title", *link, "", *class).unwrap())
            .collect();
        batch.insert(engine, entries);
        batch
    }

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    #[test]
    fn bucket_rounds_down() {
        let store = MemoryStore::new(3_600);
        store.persist_at(
            "rust",
            &batch(SearchEngine::Bing, &[("https://a.example/", Classification::Organic)]),
            at(7_300),
        );
        assert_eq!(store.lock().rows[0].bucket, 7_200);
    }

    #[test]
    fn equivalent_links_upsert_within_a_bucket() {
        let store = MemoryStore::new(3_600);
        let first = store.persist_at(
            "Rust",
            &batch(SearchEngine::Bing, &[("https://a.example/x", Classification::Organic)]),
            at(10),
        );
        let second = store.persist_at(
            "rust ",
            &batch(
                SearchEngine::Bing,
                &[("https://A.example/x/?utm_source=s", Classification::Advertisement)],
            ),
            at(20),
        );
        assert_eq!(first, PersistSummary { inserted: 1, updated: 0 });
        assert_eq!(second, PersistSummary { inserted: 0, updated: 1 });
        assert_eq!(store.len(), 1);
        let row = &store.lock().rows[0];
        assert_eq!(row.classification, Classification::Advertisement);
        assert_eq!(row.link, "https://a.example/x");
        assert_eq!(row.updated_at, at(20));
    }

    #[test]
    fn same_link_on_two_engines_is_two_rows() {
        let store = MemoryStore::new(3_600);
        let links = [("https://a.example/", Classification::Organic)];
        store.persist_at("rust", &batch(SearchEngine::Bing, &links), at(0));
        store.persist_at("rust", &batch(SearchEngine::Yahoo, &links), at(0));
        assert_eq!(store.len(), 2);
    }

    #[tokio::test]
    async fn pending_rows_are_organic_and_unscanned() {
        let store = MemoryStore::new(3_600);
        store.persist_at(
            "rust",
            &batch(
                SearchEngine::Google,
                &[
                    ("https://a.example/", Classification::Organic),
                    ("https://ad.example/", Classification::Advertisement),
                ],
            ),
            at(0),
        );
        let pending = store.pending_rows(None).await.unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].link, "https://a.example/");

        store.record_occurrences(pending[0].id, 4, at(5)).await.unwrap();
        assert!(store.pending_rows(None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn recording_an_unknown_row_is_not_found() {
        let store = MemoryStore::new(60);
        let err = store.record_occurrences(42, 1, at(0)).await.unwrap_err();
        assert!(matches!(err, SerpError::NotFound(_)));
    }

    #[tokio::test]
    async fn blank_search_term_is_a_storage_error() {
        let store = MemoryStore::new(60);
        let err = store
            .persist_results(" ", &SearchBatch::new("x"))
            .await
            .unwrap_err();
        assert!(matches!(err, SerpError::Storage(_)));
    }
}

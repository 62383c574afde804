//! Keyword-occurrence scanning of stored organic results.
//!
//! Each pending row's page is fetched in plain mode and the row's search
//! term is counted as a case-insensitive whole word in the raw HTML.

use std::sync::Arc;

use chrono::Utc;
use regex::Regex;
use serde::Serialize;
use serp_scrape::transport::PlainFetcher;

use crate::error::{Result, SerpError};
use crate::storage::{PersistedRow, ResultStore};

/// Case-insensitive whole-word occurrences of `term` in `haystack`.
/// A blank term counts zero.
pub fn count_occurrences(haystack: &str, term: &str) -> u32 {
    let term = term.trim();
    if term.is_empty() {
        return 0;
    }
    let pattern = format!(r"(?i)\b{}\b", regex::escape(term));
    match Regex::new(&pattern) {
        Ok(re) => u32::try_from(re.find_iter(haystack).count()).unwrap_or(u32::MAX),
        Err(e) => {
            tracing::warn!(error = %e, "occurrence pattern rejected");
            0
        }
    }
}

/// Outcome of one [`OccurrenceScanner::scan_pending`] pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ScanReport {
    /// Rows fetched and counted.
    pub scanned: usize,
    /// Rows whose fetch failed. They stay pending.
    pub failed: usize,
    /// Sum of counts over scanned rows.
    pub occurrences: u64,
}

/// Fetches stored result pages and records occurrence counts.
pub struct OccurrenceScanner {
    store: Arc<dyn ResultStore>,
    fetcher: PlainFetcher,
}

impl OccurrenceScanner {
    pub fn new(store: Arc<dyn ResultStore>, fetcher: PlainFetcher) -> Self {
        Self { store, fetcher }
    }

    /// Scan every pending row, optionally only those stored under
    /// `search_term`. A row whose page cannot be fetched is logged and
    /// skipped; the others still run.
    ///
    /// # Errors
    ///
    /// Only store failures abort the pass.
    pub async fn scan_pending(&self, search_term: Option<&str>) -> Result<ScanReport> {
        let rows = self.store.pending_rows(search_term).await?;
        tracing::debug!(rows = rows.len(), "occurrence scan started");

        let mut report = ScanReport::default();
        for row in rows {
            match self.scan_row(&row).await {
                Ok(count) => {
                    report.scanned += 1;
                    report.occurrences += u64::from(count);
                }
                Err(SerpError::Scrape(e)) => {
                    tracing::warn!(id = row.id, url = %row.link, error = %e, "page fetch failed, skipping");
                    report.failed += 1;
                }
                Err(e) => return Err(e),
            }
        }
        tracing::info!(
            scanned = report.scanned,
            failed = report.failed,
            occurrences = report.occurrences,
            "occurrence scan finished"
        );
        Ok(report)
    }

    /// Count occurrences for the stored row matching `url` and record it.
    ///
    /// # Errors
    ///
    /// Returns [`SerpError::NotFound`] when no row is stored for `url`, and
    /// the fetch error when the page cannot be retrieved.
    pub async fn count_for_url(&self, url: &str) -> Result<u32> {
        let row = self
            .store
            .fetch_stored_entry(url)
            .await?
            .ok_or_else(|| SerpError::NotFound(url.to_owned()))?;
        self.scan_row(&row).await
    }

    async fn scan_row(&self, row: &PersistedRow) -> Result<u32> {
        let html = self.fetcher.fetch(&row.link).await?;
        let count = count_occurrences(&html, &row.search_term);
        tracing::trace!(id = row.id, count, "occurrences counted");
        self.store.record_occurrences(row.id, count, Utc::now()).await?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MOCK_PAGE_HTML: &str = r#"<html><head><title>Rust tips</title></head>
<body><p>RUST is fast. Learn rust-lang and rust.</p>
<p>Trustworthy rusty code is not counted.</p></body></html>"#;

    #[test]
    fn counts_whole_words_case_insensitively() {
        assert_eq!(count_occurrences(MOCK_PAGE_HTML, "rust"), 4);
    }

    #[test]
    fn multi_word_terms_and_metacharacters_are_literal() {
        assert_eq!(count_occurrences("Node.js, node.JS and nodexjs", "node.js"), 2);
        assert_eq!(count_occurrences("Rust Tips, rust tips!", "rust tips"), 2);
    }

    #[test]
    fn blank_term_counts_zero() {
        assert_eq!(count_occurrences(MOCK_PAGE_HTML, "  "), 0);
    }
}

//! Search, persist, and report a structured outcome.

use std::sync::Arc;

use serde::Serialize;
use serp_scrape::{FetchTransport, MultiEngineCoordinator, SearchBatch, Transport};

use crate::config::SerpConfig;
use crate::error::{Result, SerpError};
use crate::storage::{PersistedRow, ResultStore};

/// Serializable result of [`SearchService::search`].
///
/// Serializes as `{"success": true, "batch": {...}}` or
/// `{"success": false, "error": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchOutcome {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    batch: Option<SearchBatch>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl SearchOutcome {
    pub fn succeeded(batch: SearchBatch) -> Self {
        Self {
            success: true,
            batch: Some(batch),
            error: None,
        }
    }

    pub fn failed(error: impl ToString) -> Self {
        Self {
            success: false,
            batch: None,
            error: Some(error.to_string()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    pub fn batch(&self) -> Option<&SearchBatch> {
        self.batch.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

/// Runs multi-engine searches and stores their results.
pub struct SearchService<T: Transport> {
    coordinator: MultiEngineCoordinator<T>,
    store: Arc<dyn ResultStore>,
}

impl SearchService<FetchTransport> {
    /// A service over the production transport.
    ///
    /// # Errors
    ///
    /// Returns [`SerpError::Config`] for an invalid config and
    /// [`SerpError::Scrape`] if the transport cannot be built.
    pub fn from_config(config: &SerpConfig, store: Arc<dyn ResultStore>) -> Result<Self> {
        config.validate()?;
        let coordinator = MultiEngineCoordinator::from_config(config.scrape.clone())?;
        Ok(Self::new(coordinator, store))
    }
}

impl<T: Transport> SearchService<T> {
    pub fn new(coordinator: MultiEngineCoordinator<T>, store: Arc<dyn ResultStore>) -> Self {
        Self { coordinator, store }
    }

    pub fn coordinator(&self) -> &MultiEngineCoordinator<T> {
        &self.coordinator
    }

    pub fn store(&self) -> &Arc<dyn ResultStore> {
        &self.store
    }

    /// Search `keyword` and persist the batch. Failures become a
    /// [`SearchOutcome`] with `success: false`; engine failures only show as
    /// fewer entries.
    ///
    /// `target` defaults to the configured per-engine target.
    pub async fn search(&self, keyword: &str, target: Option<usize>) -> SearchOutcome {
        match self.try_search(keyword, target).await {
            Ok(batch) => SearchOutcome::succeeded(batch),
            Err(e) => {
                tracing::warn!(error = %e, "search failed");
                SearchOutcome::failed(e)
            }
        }
    }

    /// Like [`search`](Self::search) but returning the error.
    ///
    /// # Errors
    ///
    /// Returns [`SerpError::Scrape`] for a blank keyword and
    /// [`SerpError::Storage`] if the batch cannot be persisted.
    pub async fn try_search(&self, keyword: &str, target: Option<usize>) -> Result<SearchBatch> {
        let target = target.unwrap_or(self.coordinator.config().target_per_engine);
        let batch = self.coordinator.search(keyword, target).await?;
        let persisted = self.store.persist_results(batch.keyword(), &batch).await?;
        tracing::info!(
            non_organic = batch.non_organic_len(),
            total = batch.total_len(),
            inserted = persisted.inserted,
            updated = persisted.updated,
            "search stored"
        );
        Ok(batch)
    }

    /// Rows stored for `keyword` by the latest search of each engine.
    ///
    /// # Errors
    ///
    /// Returns the store's error.
    pub async fn stored(&self, keyword: &str) -> Result<Vec<PersistedRow>> {
        let keyword = keyword.trim();
        if keyword.is_empty() {
            return Err(SerpError::Scrape(serp_scrape::ScrapeError::InvalidKeyword(
                "keyword is empty".into(),
            )));
        }
        self.store.latest_for_term(keyword).await
    }
}

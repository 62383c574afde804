//! Multi-engine search: one pagination loop per engine, run concurrently,
//! merged into a [`SearchBatch`].
//!
//! Engines share nothing but the transport and the observer. An engine
//! whose pipeline fails contributes an empty sequence and never aborts the
//! others. Links are not deduplicated across engines.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures::future::join_all;
use tokio_util::sync::CancellationToken;

use crate::circuit_breaker::{CircuitBreaker, CircuitState};
use crate::config::ScrapeConfig;
use crate::engine::EngineStrategy;
use crate::engines::strategy_for;
use crate::error::{Result, ScrapeError};
use crate::observer::{ScrapeEvent, ScrapeObserver, TracingObserver};
use crate::pagination::PaginationController;
use crate::transport::{FetchTransport, Transport};
use crate::types::{ResultEntry, SearchBatch, SearchEngine};

/// Runs every configured engine for a keyword and merges the results.
pub struct MultiEngineCoordinator<T: Transport> {
    transport: T,
    strategies: Vec<Box<dyn EngineStrategy>>,
    observer: Arc<dyn ScrapeObserver>,
    config: ScrapeConfig,
    breaker: Mutex<CircuitBreaker>,
}

impl MultiEngineCoordinator<FetchTransport> {
    /// A coordinator using the production HTTP and browser transport.
    ///
    /// # Errors
    ///
    /// Returns [`ScrapeError::Config`] for an invalid config and
    /// [`ScrapeError::Http`] if the HTTP client cannot be built.
    pub fn from_config(config: ScrapeConfig) -> Result<Self> {
        config.validate()?;
        let transport = FetchTransport::new(&config)?;
        Self::new(transport, config)
    }
}

impl<T: Transport> MultiEngineCoordinator<T> {
    /// A coordinator over `transport` scraping `config.engines`, each once.
    ///
    /// # Errors
    ///
    /// Returns [`ScrapeError::Config`] if `config` fails validation.
    pub fn new(transport: T, config: ScrapeConfig) -> Result<Self> {
        config.validate()?;
        let mut seen = HashSet::new();
        let strategies = config
            .engines
            .iter()
            .filter(|engine| seen.insert(**engine))
            .map(|engine| strategy_for(*engine))
            .collect();
        Ok(Self::with_strategies(transport, strategies, config))
    }

    /// A coordinator over explicit strategies. `config.engines` is ignored.
    pub fn with_strategies(
        transport: T,
        strategies: Vec<Box<dyn EngineStrategy>>,
        config: ScrapeConfig,
    ) -> Self {
        let breaker = Mutex::new(CircuitBreaker::new(config.circuit_breaker.clone()));
        Self {
            transport,
            strategies,
            observer: Arc::new(TracingObserver),
            config,
            breaker,
        }
    }

    /// Replace the default [`TracingObserver`].
    pub fn with_observer(mut self, observer: Arc<dyn ScrapeObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn config(&self) -> &ScrapeConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Engines this coordinator scrapes, in run order.
    pub fn engines(&self) -> Vec<SearchEngine> {
        self.strategies.iter().map(|s| s.engine()).collect()
    }

    /// Circuit state and consecutive failures for every engine run so far.
    pub fn engine_health(&self) -> Vec<(SearchEngine, CircuitState, u32)> {
        self.breaker().health_report()
    }

    /// Search every engine for up to `target_per_engine` unique entries.
    ///
    /// # Errors
    ///
    /// Returns [`ScrapeError::InvalidKeyword`] if `keyword` is blank. Engine
    /// failures are not errors: they show up as empty sequences.
    pub async fn search(&self, keyword: &str, target_per_engine: usize) -> Result<SearchBatch> {
        self.search_with_cancel(keyword, target_per_engine, &CancellationToken::new())
            .await
    }

    /// Like [`search`](Self::search), stopping early when `cancel` fires or
    /// the configured search deadline elapses. Each engine then returns what
    /// it has accumulated.
    ///
    /// # Errors
    ///
    /// Returns [`ScrapeError::InvalidKeyword`] if `keyword` is blank.
    pub async fn search_with_cancel(
        &self,
        keyword: &str,
        target_per_engine: usize,
        cancel: &CancellationToken,
    ) -> Result<SearchBatch> {
        let keyword = keyword.trim();
        if keyword.is_empty() {
            return Err(ScrapeError::InvalidKeyword("keyword is empty".into()));
        }
        tracing::trace!(keyword, target_per_engine, "multi-engine search");

        let token = cancel.child_token();
        let watchdog = self.config.search_deadline().map(|deadline| {
            let token = token.clone();
            tokio::spawn(async move {
                tokio::time::sleep(deadline).await;
                tracing::debug!(
                    deadline_secs = deadline.as_secs(),
                    "search deadline elapsed, cancelling engines"
                );
                token.cancel();
            })
        });

        let runs = self
            .strategies
            .iter()
            .map(|strategy| self.run_engine(strategy.as_ref(), keyword, target_per_engine, &token));
        let results = join_all(runs).await;

        if let Some(watchdog) = watchdog {
            watchdog.abort();
        }

        let mut batch = SearchBatch::new(keyword);
        for (engine, entries) in results {
            batch.insert(engine, entries);
        }
        tracing::debug!(
            total = batch.total_len(),
            non_organic = batch.non_organic_len(),
            "search complete"
        );
        Ok(batch)
    }

    async fn run_engine(
        &self,
        strategy: &dyn EngineStrategy,
        keyword: &str,
        target: usize,
        cancel: &CancellationToken,
    ) -> (SearchEngine, Vec<ResultEntry>) {
        let engine = strategy.engine();
        let admitted = self.breaker().admit(engine);
        if !admitted {
            self.observer
                .on_event(&ScrapeEvent::EngineSkipped { engine });
            return (engine, Vec::new());
        }

        let controller = PaginationController::new(
            &self.transport,
            strategy,
            self.observer.as_ref(),
            &self.config,
        );
        match controller.run(keyword, target, cancel).await {
            Ok(entries) => {
                self.breaker().record_success(engine);
                tracing::debug!(%engine, count = entries.len(), "engine finished");
                (engine, entries)
            }
            Err(error) => {
                self.observer
                    .on_event(&ScrapeEvent::EngineFailed { engine, error: &error });
                self.breaker().record_failure(engine);
                (engine, Vec::new())
            }
        }
    }

    /// The breaker is only touched between awaits, never across one.
    fn breaker(&self) -> MutexGuard<'_, CircuitBreaker> {
        self.breaker.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

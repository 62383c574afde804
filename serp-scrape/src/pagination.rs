//! Per-engine pagination: repeated fetch and parse until the target is
//! reached or the engine stops producing new links.
//!
//! One [`PaginationController::run`] call walks the states
//! `Fetching → Parsing → Accumulating → Deciding → {Fetching | Done}` for a
//! single engine. The loop always terminates: every fetch is bounded by a
//! timeout, a page that adds no unseen links stops it, and accumulation is
//! capped by `hard_cap` whatever the requested target.

use std::collections::HashSet;

use tokio_util::sync::CancellationToken;

use crate::config::ScrapeConfig;
use crate::engine::EngineStrategy;
use crate::error::{Result, ScrapeError};
use crate::observer::{ScrapeEvent, ScrapeObserver};
use crate::transport::{RenderMode, Transport};
use crate::types::ResultEntry;

/// Progress of one engine's pagination. Owned by a single `run` call and
/// dropped when it returns.
#[derive(Debug)]
pub struct EngineQueryState {
    offset: usize,
    accumulated: Vec<ResultEntry>,
    seen: HashSet<String>,
    limit: usize,
}

impl EngineQueryState {
    fn new(limit: usize) -> Self {
        Self {
            offset: 0,
            accumulated: Vec::new(),
            seen: HashSet::new(),
            limit,
        }
    }

    /// Append entries whose link has not been seen, in order. Returns how
    /// many were new.
    fn absorb(&mut self, entries: Vec<ResultEntry>) -> usize {
        let before = self.accumulated.len();
        for entry in entries {
            if self.seen.insert(entry.link().to_owned()) {
                self.accumulated.push(entry);
            }
        }
        self.accumulated.len() - before
    }

    fn is_full(&self) -> bool {
        self.accumulated.len() >= self.limit
    }

    fn into_entries(mut self) -> Vec<ResultEntry> {
        self.accumulated.truncate(self.limit);
        self.accumulated
    }
}

/// Drives one engine's fetch/parse cycles.
pub struct PaginationController<'a, T: Transport> {
    transport: &'a T,
    strategy: &'a dyn EngineStrategy,
    observer: &'a dyn ScrapeObserver,
    config: &'a ScrapeConfig,
}

impl<'a, T: Transport> PaginationController<'a, T> {
    pub fn new(
        transport: &'a T,
        strategy: &'a dyn EngineStrategy,
        observer: &'a dyn ScrapeObserver,
        config: &'a ScrapeConfig,
    ) -> Self {
        Self {
            transport,
            strategy,
            observer,
            config,
        }
    }

    /// Collect up to `target` unique entries for `keyword`.
    ///
    /// Entries keep first-seen order and links are unique. The result holds
    /// at most `min(target, hard_cap)` entries. When `cancel` fires the
    /// entries accumulated so far are returned, as with a stall.
    ///
    /// # Errors
    ///
    /// Returns [`ScrapeError::EngineFailed`] when one page fails to fetch
    /// `max_fetch_attempts` times in a row.
    pub async fn run(
        &self,
        keyword: &str,
        target: usize,
        cancel: &CancellationToken,
    ) -> Result<Vec<ResultEntry>> {
        let engine = self.strategy.engine();
        let cap = self.config.hard_cap;
        let mut state = EngineQueryState::new(target.min(cap));
        if state.limit == 0 {
            return Ok(Vec::new());
        }
        let mut attempts = 0u32;

        loop {
            if cancel.is_cancelled() {
                return Ok(self.cancelled(state));
            }

            // Fetching
            let url = self.strategy.build_url(keyword, state.offset);
            let fetched = tokio::select! {
                biased;
                () = cancel.cancelled() => return Ok(self.cancelled(state)),
                fetched = self.transport.fetch(&url, RenderMode::Rendered) => fetched,
            };
            let raw = match fetched {
                Ok(raw) => {
                    attempts = 0;
                    raw
                }
                Err(error) => {
                    attempts += 1;
                    self.observer.on_event(&ScrapeEvent::FetchFailed {
                        engine,
                        url: &url,
                        attempt: attempts,
                        error: &error,
                    });
                    if attempts >= self.config.max_fetch_attempts {
                        return Err(ScrapeError::EngineFailed {
                            engine,
                            attempts,
                            last_error: error.to_string(),
                        });
                    }
                    if !self.pause(cancel).await {
                        return Ok(self.cancelled(state));
                    }
                    continue;
                }
            };
            self.observer.on_event(&ScrapeEvent::PageFetched {
                engine,
                url: &url,
                offset: state.offset,
                bytes: raw.len(),
            });

            // Parsing, Accumulating
            let parsed = self.strategy.parse_observed(&raw, self.observer);
            let added = state.absorb(parsed);

            // Deciding
            if state.is_full() {
                let count = state.accumulated.len().min(state.limit);
                if target > cap {
                    self.observer
                        .on_event(&ScrapeEvent::CapReached { engine, cap });
                } else {
                    self.observer
                        .on_event(&ScrapeEvent::TargetReached { engine, count });
                }
                return Ok(state.into_entries());
            }
            if added == 0 {
                self.observer.on_event(&ScrapeEvent::StallTriggered {
                    engine,
                    offset: state.offset,
                    accumulated: state.accumulated.len(),
                });
                return Ok(state.into_entries());
            }

            state.offset += self.strategy.page_stride();
            if !self.pause(cancel).await {
                return Ok(self.cancelled(state));
            }
        }
    }

    /// Politeness delay between pages. `false` when cancelled meanwhile.
    async fn pause(&self, cancel: &CancellationToken) -> bool {
        tokio::select! {
            biased;
            () = cancel.cancelled() => false,
            () = tokio::time::sleep(self.config.page_delay()) => true,
        }
    }

    fn cancelled(&self, state: EngineQueryState) -> Vec<ResultEntry> {
        self.observer.on_event(&ScrapeEvent::Cancelled {
            engine: self.strategy.engine(),
            accumulated: state.accumulated.len(),
        });
        state.into_entries()
    }
}

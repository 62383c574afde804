//! Structured observability hook for the scraping pipeline.
//!
//! Parsers, pagination loops and the coordinator report what they do as
//! [`ScrapeEvent`]s to an injected [`ScrapeObserver`]. The default
//! [`TracingObserver`] turns them into `tracing` records; tests inject a
//! recording observer instead.

use crate::classify::{ContainerKind, Evidence};
use crate::error::ScrapeError;
use crate::http::redact_url;
use crate::types::{Classification, SearchEngine};

/// Something noteworthy that happened while scraping.
#[derive(Debug)]
pub enum ScrapeEvent<'a> {
    /// A result page was fetched.
    PageFetched {
        engine: SearchEngine,
        url: &'a str,
        offset: usize,
        bytes: usize,
    },
    /// A fetch failed; the page will be retried unless attempts are spent.
    FetchFailed {
        engine: SearchEngine,
        url: &'a str,
        attempt: u32,
        error: &'a ScrapeError,
    },
    /// A container matched one of the engine's selector groups.
    ContainerMatched {
        engine: SearchEngine,
        kind: ContainerKind,
    },
    /// A container was dropped because it lacked a title or link.
    ContainerSkipped {
        engine: SearchEngine,
        kind: ContainerKind,
        reason: &'static str,
    },
    /// An entry was classified, with the evidence that decided it.
    EntryClassified {
        engine: SearchEngine,
        link: &'a str,
        classification: Classification,
        evidence: Option<&'a Evidence>,
    },
    /// A page added no unseen links, so pagination stopped.
    StallTriggered {
        engine: SearchEngine,
        offset: usize,
        accumulated: usize,
    },
    /// The requested number of entries was reached.
    TargetReached { engine: SearchEngine, count: usize },
    /// The internal hard cap was reached before the target.
    CapReached { engine: SearchEngine, cap: usize },
    /// The search was cancelled; the engine keeps what it accumulated.
    Cancelled {
        engine: SearchEngine,
        accumulated: usize,
    },
    /// The engine's pipeline failed; it contributes no entries.
    EngineFailed {
        engine: SearchEngine,
        error: &'a ScrapeError,
    },
    /// The engine was not run because its circuit is open.
    EngineSkipped { engine: SearchEngine },
}

/// Receives pipeline events. Implementations must be cheap and must not
/// block: they are called inline from parsing and pagination.
pub trait ScrapeObserver: Send + Sync {
    fn on_event(&self, event: &ScrapeEvent<'_>);
}

/// Forwards events to `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl ScrapeObserver for TracingObserver {
    fn on_event(&self, event: &ScrapeEvent<'_>) {
        match event {
            ScrapeEvent::PageFetched {
                engine,
                url,
                offset,
                bytes,
            } => {
                tracing::trace!(%engine, url, "page url");
                tracing::debug!(%engine, page = %redact_url(url), offset, bytes, "page fetched")
            }
            ScrapeEvent::FetchFailed {
                engine,
                url,
                attempt,
                error,
            } => {
                tracing::trace!(%engine, url, "failed page url");
                tracing::warn!(%engine, page = %redact_url(url), attempt, %error, "fetch failed")
            }
            ScrapeEvent::ContainerMatched { engine, kind } => {
                tracing::trace!(%engine, ?kind, "container matched")
            }
            ScrapeEvent::ContainerSkipped {
                engine,
                kind,
                reason,
            } => tracing::trace!(%engine, ?kind, reason, "container skipped"),
            ScrapeEvent::EntryClassified {
                engine,
                link,
                classification,
                evidence,
            } => tracing::trace!(%engine, link, %classification, ?evidence, "entry classified"),
            ScrapeEvent::StallTriggered {
                engine,
                offset,
                accumulated,
            } => tracing::debug!(%engine, offset, accumulated, "no new links, stopping"),
            ScrapeEvent::TargetReached { engine, count } => {
                tracing::debug!(%engine, count, "target reached")
            }
            ScrapeEvent::CapReached { engine, cap } => {
                tracing::debug!(%engine, cap, "hard cap reached")
            }
            ScrapeEvent::Cancelled {
                engine,
                accumulated,
            } => tracing::debug!(%engine, accumulated, "search cancelled"),
            ScrapeEvent::EngineFailed { engine, error } => {
                tracing::warn!(%engine, %error, "engine failed, contributing no entries")
            }
            ScrapeEvent::EngineSkipped { engine } => {
                tracing::warn!(%engine, "engine skipped, circuit open")
            }
        }
    }
}

/// Discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl ScrapeObserver for NoopObserver {
    fn on_event(&self, _event: &ScrapeEvent<'_>) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn observers_are_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<TracingObserver>();
        assert_send_sync::<NoopObserver>();
    }

    #[test]
    fn tracing_observer_handles_every_event() {
        let err = ScrapeError::Http("boom".into());
        let evidence = Evidence::AdLabel("Sponsored".into());
        let events = [
            ScrapeEvent::PageFetched {
                engine: SearchEngine::Bing,
                url: "https://www.bing.com/search?q=x",
                offset: 0,
                bytes: 10,
            },
            ScrapeEvent::FetchFailed {
                engine: SearchEngine::Bing,
                url: "https://www.bing.com/search?q=x",
                attempt: 1,
                error: &err,
            },
            ScrapeEvent::ContainerMatched {
                engine: SearchEngine::Google,
                kind: ContainerKind::Ad,
            },
            ScrapeEvent::ContainerSkipped {
                engine: SearchEngine::Google,
                kind: ContainerKind::Primary,
                reason: "missing title",
            },
            ScrapeEvent::EntryClassified {
                engine: SearchEngine::Yahoo,
                link: "https://a.com",
                classification: Classification::Advertisement,
                evidence: Some(&evidence),
            },
            ScrapeEvent::StallTriggered {
                engine: SearchEngine::DuckDuckGo,
                offset: 30,
                accumulated: 12,
            },
            ScrapeEvent::TargetReached {
                engine: SearchEngine::Google,
                count: 10,
            },
            ScrapeEvent::CapReached {
                engine: SearchEngine::Google,
                cap: 250,
            },
            ScrapeEvent::Cancelled {
                engine: SearchEngine::Yahoo,
                accumulated: 3,
            },
            ScrapeEvent::EngineFailed {
                engine: SearchEngine::Bing,
                error: &err,
            },
            ScrapeEvent::EngineSkipped {
                engine: SearchEngine::Bing,
            },
        ];
        for event in &events {
            TracingObserver.on_event(event);
            NoopObserver.on_event(event);
        }
    }
}

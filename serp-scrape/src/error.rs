//! Error types for the serp-scrape crate.
//!
//! Messages are stable lowercase strings. Failing pages are named by URL
//! with the query string removed, so keywords stay out of error text.

use crate::types::SearchEngine;

/// Errors that can occur while fetching or scraping result pages.
#[derive(Debug, thiserror::Error)]
pub enum ScrapeError {
    /// A plain HTTP fetch failed: network error or non-2xx status.
    #[error("HTTP error: {0}")]
    Http(String),

    /// A fetch exceeded its time budget.
    #[error("timed out: {0}")]
    Timeout(String),

    /// The headless browser could not be launched or driven.
    #[error("browser error: {0}")]
    Browser(String),

    /// The keyword is unusable (empty after trimming).
    #[error("invalid keyword: {0}")]
    InvalidKeyword(String),

    /// Invalid scrape configuration.
    #[error("config error: {0}")]
    Config(String),

    /// An engine's pipeline gave up after repeated transport failures.
    #[error("{engine} failed after {attempts} attempts: {last_error}")]
    EngineFailed {
        engine: SearchEngine,
        attempts: u32,
        last_error: String,
    },
}

impl ScrapeError {
    /// `true` for errors raised by the transport layer.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Http(_) | Self::Timeout(_) | Self::Browser(_))
    }
}

/// Convenience type alias for serp-scrape results.
pub type Result<T> = std::result::Result<T, ScrapeError>;

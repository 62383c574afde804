//! Error types for the serpsift host crate.

use serp_scrape::ScrapeError;

/// Top-level error type for searching, storing and occurrence scanning.
#[derive(Debug, thiserror::Error)]
pub enum SerpError {
    /// Invalid or unreadable configuration.
    #[error("config error: {0}")]
    Config(String),

    /// Failure inside the scraping pipeline.
    #[error("scrape error: {0}")]
    Scrape(#[from] ScrapeError),

    /// The result store rejected an operation.
    #[error("storage error: {0}")]
    Storage(String),

    /// No stored row matches the requested link.
    #[error("not found: {0}")]
    NotFound(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, SerpError>;

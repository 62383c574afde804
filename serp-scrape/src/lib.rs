//! # serp-scrape
//!
//! Multi-engine search-results scraping with ad and promo classification.
//!
//! For a keyword, this crate pages through Google, Bing, DuckDuckGo and
//! Yahoo result pages, parses each page into entries tagged organic,
//! advertisement or promotional, and merges the per-engine sequences into a
//! [`SearchBatch`].
//!
//! ## Design
//!
//! - [`transport`]: plain HTTP fetches and headless-browser rendered fetches
//! - [`engine::EngineStrategy`]: per-engine URL building and parsing, driven
//!   by one selector table per engine
//! - [`pagination::PaginationController`]: per-engine fetch/parse loop with
//!   link dedup, stall detection and a hard cap
//! - [`coordinator::MultiEngineCoordinator`]: runs every engine concurrently
//!   and tolerates individual engine failures
//! - [`observer`]: structured events instead of debug output
//!
//! Classification is a best-effort heuristic. Anti-bot measures are not
//! circumvented; a blocked engine simply yields fewer entries.
//!
//! Keywords are logged at trace level only.

pub mod circuit_breaker;
pub mod classify;
pub mod config;
pub mod coordinator;
pub mod detrack;
pub mod engine;
pub mod engines;
pub mod error;
pub mod http;
pub mod observer;
pub mod pagination;
pub mod transport;
pub mod types;

pub use config::ScrapeConfig;
pub use coordinator::MultiEngineCoordinator;
pub use engine::EngineStrategy;
pub use error::{Result, ScrapeError};
pub use observer::{ScrapeEvent, ScrapeObserver};
pub use transport::{FetchTransport, RenderMode, Transport};
pub use types::{Classification, ResultEntry, SearchBatch, SearchEngine};

/// Search every engine in `config` with the production transport.
///
/// Builds a fresh [`MultiEngineCoordinator`] and asks each engine for
/// `config.target_per_engine` entries. Hosts that search repeatedly should
/// keep one coordinator instead, so engine health carries across searches.
///
/// # Errors
///
/// Returns [`ScrapeError::Config`] if `config` is invalid and
/// [`ScrapeError::InvalidKeyword`] if `keyword` is blank.
///
/// # Examples
///
/// ```no_run
/// # async fn example() -> serp_scrape::Result<()> {
/// let config = serp_scrape::ScrapeConfig::default();
/// let batch = serp_scrape::search("rust programming", &config).await?;
/// for (engine, entries) in batch.iter() {
///     for entry in entries {
///         println!("{engine} [{}] {}", entry.classification(), entry.link());
///     }
/// }
/// # Ok(())
/// # }
/// ```
pub async fn search(keyword: &str, config: &ScrapeConfig) -> Result<SearchBatch> {
    let coordinator = MultiEngineCoordinator::from_config(config.clone())?;
    coordinator
        .search(keyword, config.target_per_engine)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn search_validates_config_zero_target() {
        let config = ScrapeConfig {
            target_per_engine: 0,
            ..Default::default()
        };
        let result = search("test", &config).await;
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("target_per_engine"));
    }

    #[tokio::test]
    async fn search_validates_config_empty_engines() {
        let config = ScrapeConfig {
            engines: vec![],
            ..Default::default()
        };
        let result = search("test", &config).await;
        assert!(result.unwrap_err().to_string().contains("engine"));
    }

    #[tokio::test]
    async fn search_rejects_blank_keyword() {
        let result = search("  ", &ScrapeConfig::default()).await;
        assert!(matches!(result, Err(ScrapeError::InvalidKeyword(_))));
    }

    #[tokio::test]
    #[ignore] // Live test, run with `cargo test -- --ignored`
    async fn live_search_all_engines() {
        let config = ScrapeConfig {
            target_per_engine: 5,
            ..Default::default()
        };
        let batch = search("rust programming language", &config)
            .await
            .expect("search should succeed");
        for (_, entries) in batch.iter() {
            for entry in entries {
                assert!(!entry.title().is_empty());
                assert!(!entry.link().is_empty());
            }
        }
    }
}

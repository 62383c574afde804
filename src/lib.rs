//! serpsift: multi-engine search-results scraping with storage and
//! keyword-occurrence tracking.
//!
//! The scraping pipeline lives in the [`serp_scrape`] crate. This crate adds
//! the host side around it:
//!
//! - **Config**: one TOML file ([`config::SerpConfig`])
//! - **Logging**: a stderr `tracing` subscriber ([`logging::init`])
//! - **Storage**: the [`storage::ResultStore`] boundary and an in-memory store
//! - **Service**: search then persist, reported as a [`service::SearchOutcome`]
//! - **Occurrences**: whole-word keyword counts for stored organic results

pub mod config;
pub mod dirs;
pub mod error;
pub mod logging;
pub mod normalize;
pub mod occurrence;
pub mod service;
pub mod storage;

pub use config::SerpConfig;
pub use error::{Result, SerpError};
pub use occurrence::{OccurrenceScanner, ScanReport};
pub use service::{SearchOutcome, SearchService};
pub use storage::{MemoryStore, PersistedRow, ResultStore};

pub use serp_scrape;

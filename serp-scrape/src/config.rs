//! Scrape configuration with sensible defaults.
//!
//! [`ScrapeConfig`] controls which engines are scraped, how far pagination
//! may go, timeouts, politeness delays and browser settings. The defaults
//! are tuned for slow, polite scraping rather than throughput.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::circuit_breaker::CircuitBreakerConfig;
use crate::error::ScrapeError;
use crate::types::SearchEngine;

/// Configuration for a multi-engine scrape.
///
/// Every field has a default, so a partial TOML table deserializes into a
/// complete config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrapeConfig {
    /// Engines to scrape. Each runs its own pagination loop concurrently.
    pub engines: Vec<SearchEngine>,
    /// Default number of unique entries wanted per engine.
    pub target_per_engine: usize,
    /// Upper bound on accumulated entries per engine regardless of target.
    pub hard_cap: usize,
    /// Fixed delay between consecutive result pages of one engine.
    pub page_delay_ms: u64,
    /// Random delay range `(min, max)` applied before every plain fetch.
    pub plain_delay_ms: (u64, u64),
    /// Timeout for a plain HTTP fetch, in seconds.
    pub plain_timeout_seconds: u64,
    /// How long a rendered fetch waits for the results-loaded marker.
    pub render_wait_ms: u64,
    /// Navigation timeout for a rendered fetch, in seconds.
    pub page_load_timeout_seconds: u64,
    /// Consecutive failed fetches of one page before the engine gives up.
    pub max_fetch_attempts: u32,
    /// Deadline for a whole multi-engine search. When it elapses every
    /// engine stops and keeps what it has accumulated.
    pub search_deadline_seconds: Option<u64>,
    /// Custom User-Agent. If `None`, rotates through built-in browser UAs.
    pub user_agent: Option<String>,
    /// Chrome/Chromium binary for rendered fetches. If `None`, the
    /// browser is located automatically.
    pub chrome_executable: Option<PathBuf>,
    /// Try a plain fetch when the browser cannot be launched, before
    /// settling for the placeholder document.
    pub render_fallback_to_plain: bool,
    /// Per-engine health tracking across searches.
    pub circuit_breaker: CircuitBreakerConfig,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            engines: SearchEngine::all().to_vec(),
            target_per_engine: 10,
            hard_cap: 250,
            page_delay_ms: 1_000,
            plain_delay_ms: (1_500, 3_500),
            plain_timeout_seconds: 5,
            render_wait_ms: 8_000,
            page_load_timeout_seconds: 30,
            max_fetch_attempts: 3,
            search_deadline_seconds: None,
            user_agent: None,
            chrome_executable: None,
            render_fallback_to_plain: false,
            circuit_breaker: CircuitBreakerConfig::default(),
        }
    }
}

impl ScrapeConfig {
    /// Validates this configuration, returning an error if any field is invalid.
    ///
    /// Checks:
    /// - `engines` must not be empty
    /// - `target_per_engine` and `hard_cap` must be greater than 0
    /// - all timeouts must be greater than 0
    /// - `plain_delay_ms.0` must be <= `plain_delay_ms.1`
    /// - `max_fetch_attempts` must be greater than 0
    pub fn validate(&self) -> Result<(), ScrapeError> {
        if self.engines.is_empty() {
            return Err(ScrapeError::Config(
                "at least one engine must be enabled".into(),
            ));
        }
        if self.target_per_engine == 0 {
            return Err(ScrapeError::Config(
                "target_per_engine must be greater than 0".into(),
            ));
        }
        if self.hard_cap == 0 {
            return Err(ScrapeError::Config("hard_cap must be greater than 0".into()));
        }
        if self.plain_timeout_seconds == 0 || self.page_load_timeout_seconds == 0 {
            return Err(ScrapeError::Config(
                "timeouts must be greater than 0".into(),
            ));
        }
        if self.plain_delay_ms.0 > self.plain_delay_ms.1 {
            return Err(ScrapeError::Config(
                "plain_delay_ms min must be <= max".into(),
            ));
        }
        if self.max_fetch_attempts == 0 {
            return Err(ScrapeError::Config(
                "max_fetch_attempts must be greater than 0".into(),
            ));
        }
        if self.search_deadline_seconds == Some(0) {
            return Err(ScrapeError::Config(
                "search_deadline_seconds must be greater than 0 when set".into(),
            ));
        }
        Ok(())
    }

    pub fn page_delay(&self) -> Duration {
        Duration::from_millis(self.page_delay_ms)
    }

    pub fn plain_timeout(&self) -> Duration {
        Duration::from_secs(self.plain_timeout_seconds)
    }

    pub fn render_wait(&self) -> Duration {
        Duration::from_millis(self.render_wait_ms)
    }

    pub fn page_load_timeout(&self) -> Duration {
        Duration::from_secs(self.page_load_timeout_seconds)
    }

    pub fn search_deadline(&self) -> Option<Duration> {
        self.search_deadline_seconds.map(Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_sensible_values() {
        let config = ScrapeConfig::default();
        assert_eq!(config.target_per_engine, 10);
        assert_eq!(config.hard_cap, 250);
        assert_eq!(config.plain_delay_ms, (1_500, 3_500));
        assert_eq!(config.plain_timeout_seconds, 5);
        assert_eq!(config.max_fetch_attempts, 3);
        assert!(config.search_deadline_seconds.is_none());
        assert!(config.user_agent.is_none());
        assert!(!config.render_fallback_to_plain);
    }

    #[test]
    fn default_engines_include_all_four() {
        let config = ScrapeConfig::default();
        assert_eq!(config.engines.len(), 4);
        assert!(config.engines.contains(&SearchEngine::Yahoo));
        assert!(config.engines.contains(&SearchEngine::DuckDuckGo));
    }

    #[test]
    fn valid_config_passes_validation() {
        assert!(ScrapeConfig::default().validate().is_ok());
    }

    #[test]
    fn empty_engines_rejected() {
        let config = ScrapeConfig {
            engines: vec![],
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("engine"));
    }

    #[test]
    fn zero_target_rejected() {
        let config = ScrapeConfig {
            target_per_engine: 0,
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("target_per_engine"));
    }

    #[test]
    fn zero_cap_rejected() {
        let config = ScrapeConfig {
            hard_cap: 0,
            ..Default::default()
        };
        assert!(config.validate().unwrap_err().to_string().contains("hard_cap"));
    }

    #[test]
    fn zero_timeout_rejected() {
        let config = ScrapeConfig {
            plain_timeout_seconds: 0,
            ..Default::default()
        };
        assert!(config.validate().unwrap_err().to_string().contains("timeout"));
    }

    #[test]
    fn inverted_delay_range_rejected() {
        let config = ScrapeConfig {
            plain_delay_ms: (3_500, 1_500),
            ..Default::default()
        };
        assert!(config.validate().unwrap_err().to_string().contains("delay"));
    }

    #[test]
    fn zero_attempts_rejected() {
        let config = ScrapeConfig {
            max_fetch_attempts: 0,
            ..Default::default()
        };
        assert!(config
            .validate()
            .unwrap_err()
            .to_string()
            .contains("max_fetch_attempts"));
    }

    #[test]
    fn zero_deadline_rejected() {
        let config = ScrapeConfig {
            search_deadline_seconds: Some(0),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config: ScrapeConfig =
            serde_json::from_str(r#"{"engines":["Bing"],"hard_cap":40}"#).expect("deserialize");
        assert_eq!(config.engines, vec![SearchEngine::Bing]);
        assert_eq!(config.hard_cap, 40);
        assert_eq!(config.target_per_engine, 10);
        assert_eq!(config.plain_delay_ms, (1_500, 3_500));
    }

    #[test]
    fn duration_helpers() {
        let config = ScrapeConfig {
            search_deadline_seconds: Some(12),
            ..Default::default()
        };
        assert_eq!(config.page_delay(), Duration::from_millis(1_000));
        assert_eq!(config.plain_timeout(), Duration::from_secs(5));
        assert_eq!(config.render_wait(), Duration::from_millis(8_000));
        assert_eq!(config.search_deadline(), Some(Duration::from_secs(12)));
    }
}

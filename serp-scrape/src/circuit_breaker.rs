//! Per-engine circuit breaker across searches.
//!
//! A coordinator owns one [`CircuitBreaker`]. An engine whose whole
//! pipeline fails `failure_threshold` searches in a row is skipped (it
//! contributes an empty sequence) until `cooldown_secs` have passed; the
//! next search then probes it once.
//!
//! ```text
//! Closed --threshold failures--> Open --cooldown--> HalfOpen
//!   ^                                                  |
//!   +------------------- success ----------------------+
//!                        failure: back to Open
//! ```

use std::collections::HashMap;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::types::SearchEngine;

/// Circuit state for a single engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    /// Healthy: the engine is scraped normally.
    Closed,
    /// Failing: the engine is skipped until the cooldown elapses.
    Open,
    /// Cooldown elapsed: the next search is a probe.
    HalfOpen,
}

/// Configuration for circuit breaker behaviour.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CircuitBreakerConfig {
    /// When `false`, every engine is always attempted.
    pub enabled: bool,
    /// Consecutive failed searches before an engine is skipped.
    pub failure_threshold: u32,
    /// Seconds an engine stays skipped before it is probed again.
    pub cooldown_secs: u64,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            failure_threshold: 3,
            cooldown_secs: 60,
        }
    }
}

#[derive(Debug, Clone)]
struct EngineHealth {
    state: CircuitState,
    consecutive_failures: u32,
    opened_at: Option<Instant>,
}

impl Default for EngineHealth {
    fn default() -> Self {
        Self {
            state: CircuitState::Closed,
            consecutive_failures: 0,
            opened_at: None,
        }
    }
}

/// Tracks engine health for one coordinator.
#[derive(Debug)]
pub struct CircuitBreaker {
    config: CircuitBreakerConfig,
    engines: HashMap<SearchEngine, EngineHealth>,
}

impl CircuitBreaker {
    pub fn new(config: CircuitBreakerConfig) -> Self {
        Self {
            config,
            engines: HashMap::new(),
        }
    }

    fn cooldown(&self) -> Duration {
        Duration::from_secs(self.config.cooldown_secs)
    }

    /// Decide whether `engine` should be scraped in the current search.
    ///
    /// An open circuit whose cooldown has elapsed moves to
    /// [`CircuitState::HalfOpen`] and is admitted.
    pub fn admit(&mut self, engine: SearchEngine) -> bool {
        if !self.config.enabled {
            return true;
        }
        let cooldown = self.cooldown();
        let health = self.engines.entry(engine).or_default();
        match health.state {
            CircuitState::Closed | CircuitState::HalfOpen => true,
            CircuitState::Open => {
                let cooled = health.opened_at.is_none_or(|t| t.elapsed() >= cooldown);
                if cooled {
                    health.state = CircuitState::HalfOpen;
                }
                cooled
            }
        }
    }

    /// Record that `engine` produced a result (possibly empty) without
    /// exhausting its fetch attempts.
    pub fn record_success(&mut self, engine: SearchEngine) {
        let health = self.engines.entry(engine).or_default();
        *health = EngineHealth::default();
    }

    /// Record that `engine`'s pipeline failed for a whole search.
    pub fn record_failure(&mut self, engine: SearchEngine) {
        let threshold = self.config.failure_threshold;
        let health = self.engines.entry(engine).or_default();
        health.consecutive_failures = health.consecutive_failures.saturating_add(1);
        if health.state == CircuitState::HalfOpen || health.consecutive_failures >= threshold {
            health.state = CircuitState::Open;
            health.opened_at = Some(Instant::now());
        }
    }

    /// Current state for `engine`; engines never seen are `Closed`.
    pub fn state(&self, engine: SearchEngine) -> CircuitState {
        self.engines
            .get(&engine)
            .map_or(CircuitState::Closed, |h| h.state)
    }

    /// `(engine, state, consecutive_failures)` for every engine seen so far.
    pub fn health_report(&self) -> Vec<(SearchEngine, CircuitState, u32)> {
        let mut report: Vec<_> = self
            .engines
            .iter()
            .map(|(engine, h)| (*engine, h.state, h.consecutive_failures))
            .collect();
        report.sort_by_key(|(engine, _, _)| *engine);
        report
    }
}

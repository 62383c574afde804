//! Tracing subscriber installation.
//!
//! Logs go to stderr so a binary's stdout carries only its output.

use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;
use crate::error::{Result, SerpError};

/// Fallback when neither `RUST_LOG` nor the configured filter parses.
const DEFAULT_FILTER: &str = "info";

/// Install the global subscriber.
///
/// # Errors
///
/// Returns [`SerpError::Config`] if a global subscriber is already set.
pub fn init(config: &LoggingConfig) -> Result<()> {
    let env = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(resolve_filter(env.as_deref(), &config.filter))
        .try_init()
        .map_err(|e| SerpError::Config(format!("failed to install logging: {e}")))
}

/// `RUST_LOG` first, then the configured filter, then [`DEFAULT_FILTER`].
/// Blank or unparsable candidates are passed over.
fn resolve_filter(env: Option<&str>, configured: &str) -> EnvFilter {
    [env, Some(configured)]
        .into_iter()
        .flatten()
        .filter(|directives| !directives.trim().is_empty())
        .find_map(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_FILTER))
}

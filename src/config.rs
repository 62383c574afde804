//! Host configuration, persisted as TOML.
//!
//! ```toml
//! [scrape]
//! target_per_engine = 20
//! engines = ["Google", "DuckDuckGo"]
//!
//! [logging]
//! filter = "serpsift=debug,serp_scrape=debug"
//!
//! [storage]
//! bucket_seconds = 3600
//! ```
//!
//! Every table and field is optional.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serp_scrape::ScrapeConfig;

use crate::error::{Result, SerpError};

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SerpConfig {
    /// Scraping pipeline settings.
    pub scrape: ScrapeConfig,
    /// Log filtering.
    pub logging: LoggingConfig,
    /// Result storage.
    pub storage: StorageConfig,
}

/// Log filter used when `RUST_LOG` is not set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// An `EnvFilter` directive string.
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "serpsift=info,serp_scrape=info".to_owned(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Width of the timestamp bucket in the upsert key. Re-running a search
    /// inside one bucket updates rows instead of adding new ones.
    pub bucket_seconds: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            bucket_seconds: 3_600,
        }
    }
}

impl SerpConfig {
    /// # Errors
    ///
    /// Returns [`SerpError::Config`] for an invalid scrape section or a zero
    /// bucket width.
    pub fn validate(&self) -> Result<()> {
        self.scrape
            .validate()
            .map_err(|e| SerpError::Config(e.to_string()))?;
        if self.storage.bucket_seconds == 0 {
            return Err(SerpError::Config(
                "storage.bucket_seconds must be greater than 0".into(),
            ));
        }
        Ok(())
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| SerpError::Config(e.to_string()))
    }

    /// Save configuration to a TOML file, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written or the config cannot be serialized.
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self).map_err(|e| SerpError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// `config.toml` inside [`crate::dirs::config_dir`].
    pub fn default_config_path() -> PathBuf {
        crate::dirs::config_file()
    }

    /// Load `path`, or the default path when `None`. A missing default file
    /// yields the defaults; a missing explicit file is an error. The result
    /// is validated either way.
    ///
    /// # Errors
    ///
    /// Returns an error if a file that should be read cannot be, or if the
    /// loaded configuration is invalid.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => {
                let path = Self::default_config_path();
                if path.exists() {
                    Self::from_file(&path)?
                } else {
                    tracing::debug!(path = %path.display(), "no config file, using defaults");
                    Self::default()
                }
            }
        };
        config.validate()?;
        Ok(config)
    }
}

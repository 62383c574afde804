//! Filesystem locations used by serpsift.
//!
//! Resolved through the [`dirs`] crate so each platform gets its usual
//! config location. `SERPSIFT_CONFIG_DIR` overrides it, which is how tests
//! and containerised deployments point at a scratch directory.

use std::path::PathBuf;

/// Environment variable overriding [`config_dir`].
pub const CONFIG_DIR_ENV: &str = "SERPSIFT_CONFIG_DIR";

/// Config directory: `dirs::config_dir()/serpsift/` unless overridden.
#[must_use]
pub fn config_dir() -> PathBuf {
    if let Some(override_dir) = std::env::var_os(CONFIG_DIR_ENV) {
        return PathBuf::from(override_dir);
    }
    dirs::config_dir()
        .map(|d| d.join("serpsift"))
        .unwrap_or_else(|| PathBuf::from("/tmp/serpsift-config"))
}

/// `config_dir()/config.toml`.
#[must_use]
pub fn config_file() -> PathBuf {
    config_dir().join("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_file_lives_in_config_dir() {
        let file = config_file();
        assert_eq!(file.parent(), Some(config_dir().as_path()));
        assert!(file.ends_with("config.toml"));
    }
}

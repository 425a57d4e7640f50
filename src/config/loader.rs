//! Configuration loading and merging logic
//!
//! Precedence order (highest to lowest):
//! 1. Command line flags (applied by the CLI)
//! 2. Environment variable overrides
//! 3. Config file
//! 4. Built-in defaults

use std::path::Path;

use anyhow::{Context, Result};

use super::paths;
use super::schema::Config;

pub const DATA_DIR_ENV: &str = "KUBEDUMP_DATA_DIR";
pub const SANITIZE_ENV: &str = "KUBEDUMP_SANITIZE";
pub const PAGE_SIZE_ENV: &str = "KUBEDUMP_PAGE_SIZE";
pub const LABEL_SELECTOR_ENV: &str = "KUBEDUMP_LABEL_SELECTOR";

/// Configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with all layers merged
    ///
    /// An explicit `path` must exist; the default location is optional.
    pub fn load(path: Option<&Path>) -> Result<Config> {
        let mut config = match path {
            Some(path) => Self::load_file(path)?,
            None => {
                let default_path = paths::root_config_path();
                if default_path.exists() {
                    Self::load_file(&default_path)?
                } else {
                    Config::default()
                }
            }
        };

        Self::apply_env_overrides(&mut config);
        Ok(config)
    }

    /// Load configuration from a file
    pub fn load_file(path: &Path) -> Result<Config> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = serde_yaml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        tracing::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Load the merged configuration and check every value
    pub fn validate(path: Option<&Path>) -> Result<Config> {
        let config = Self::load(path)?;
        config.validate().context("Invalid configuration")?;
        Ok(config)
    }

    /// Apply environment variable overrides; unparseable values are ignored
    fn apply_env_overrides(config: &mut Config) {
        if let Ok(data_dir) = std::env::var(DATA_DIR_ENV) {
            if !data_dir.is_empty() {
                config.data_dir = data_dir.into();
            }
        }

        if let Ok(sanitize) = std::env::var(SANITIZE_ENV) {
            match sanitize.parse::<bool>() {
                Ok(val) => config.sanitize = val,
                Err(_) => tracing::warn!("Ignoring {}={:?}: expected true or false", SANITIZE_ENV, sanitize),
            }
        }

        if let Ok(page_size) = std::env::var(PAGE_SIZE_ENV) {
            match page_size.parse::<u32>() {
                Ok(val) => config.page_size = val,
                Err(_) => tracing::warn!("Ignoring {}={:?}: expected a number", PAGE_SIZE_ENV, page_size),
            }
        }

        if let Ok(selector) = std::env::var(LABEL_SELECTOR_ENV) {
            config.label_selector = Some(selector).filter(|s| !s.is_empty());
        }
    }
}

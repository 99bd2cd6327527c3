// Configuration module
// Author: kelexine (https://github.com/kelexine)

mod models;

pub use models::*;

use crate::error::{Result, RouterError};
use config::{Config, Environment, File};
use std::path::{Path, PathBuf};

impl AppConfig {
    /// Load configuration from multiple sources with precedence:
    /// 1. Environment variables (highest)
    /// 2. Config file (`path`, or `~/.fluxcache/config.toml`)
    /// 3. Defaults (lowest)
    ///
    /// CLI overrides are applied by the caller on top of the result.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let file = match path {
            Some(p) => File::from(p.to_path_buf()).required(true),
            None => File::with_name(&Self::default_config_path()).required(false),
        };

        let config = Config::builder()
            // Start with defaults
            .add_source(Config::try_from(&Self::default())?)
            .add_source(file)
            // Override with environment variables (FLUXCACHE_ORIGIN__BASE_URL=...)
            .add_source(
                Environment::with_prefix("FLUXCACHE")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()
            .map_err(|e| RouterError::Config(e.to_string()))?;

        config
            .try_deserialize()
            .map_err(|e| RouterError::Config(e.to_string()))
    }

    fn default_config_path() -> String {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".fluxcache")
            .join("config.toml")
            .to_string_lossy()
            .to_string()
    }
}

//! Seed data location

use std::path::PathBuf;

use crate::{get_env_or_default, ConfigError, ConfigResult};

/// Where the JSON seed files are read from at startup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataConfig {
    /// Directory holding `breweries.json`, `beers.json` and `reviews.json`
    pub data_dir: PathBuf,
}

impl DataConfig {
    /// Load data configuration from `DATA_DIR` (default `./data`)
    pub fn from_env() -> ConfigResult<Self> {
        let data_dir = get_env_or_default("DATA_DIR", "./data");
        if data_dir.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "DATA_DIR must not be empty".to_string(),
            ));
        }
        Ok(Self {
            data_dir: PathBuf::from(data_dir),
        })
    }

    /// Create a configuration pointing at `data_dir` (useful for testing)
    pub fn with_dir(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }
}

impl Default for DataConfig {
    fn default() -> Self {
        Self::with_dir("./data")
    }
}

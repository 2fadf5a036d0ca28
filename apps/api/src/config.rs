//! API server configuration

use std::env;
use std::path::Path;
use std::str::FromStr;

use anyhow::{bail, Context, Result};
use brewery_relation_loader::DispatcherOptions;
use brewery_shared_config::{CommonConfig, Environment, LoaderConfig};

/// API server configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// Common configuration shared with other services
    pub common: CommonConfig,

    /// Server port (default: 8080)
    pub port: u16,

    /// CORS allowed origins (optional)
    pub cors_allowed_origins: Option<Vec<String>>,
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// In production mode `DATA_DIR` must be set explicitly. In
    /// development/staging mode `./data` is used when it is missing.
    pub fn from_env() -> Result<Self> {
        let environment = Environment::from_str(
            &env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
        )
        .unwrap_or_default();

        Self::validate_data_dir(environment.is_production())?;

        let common = CommonConfig::from_env().context("Failed to load config")?;

        Ok(Self {
            common,

            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .context("Invalid PORT value")?,

            cors_allowed_origins: env::var("CORS_ORIGINS").ok().map(|s| {
                s.split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            }),
        })
    }

    /// Require an explicit DATA_DIR in production
    fn validate_data_dir(is_production: bool) -> Result<()> {
        match env::var("DATA_DIR") {
            Ok(dir) if !dir.trim().is_empty() => Ok(()),
            _ if is_production => {
                bail!(
                    "DATA_DIR environment variable is required in production. \
                     Point it at the directory holding the seed JSON files."
                );
            }
            _ => {
                tracing::warn!("DATA_DIR not set, reading seed data from ./data");
                Ok(())
            }
        }
    }

    /// Directory holding the seed JSON files
    pub fn data_dir(&self) -> &Path {
        &self.common.data.data_dir
    }

    /// Relation loader settings
    pub fn loader(&self) -> &LoaderConfig {
        &self.common.loader
    }

    /// Options for the per-request dispatcher
    pub fn dispatcher_options(&self) -> DispatcherOptions {
        DispatcherOptions {
            delay: self.common.loader.delay(),
            cache: self.common.loader.cache,
        }
    }

    /// Get environment mode
    pub fn environment(&self) -> Environment {
        self.common.environment
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.common.environment.is_production()
    }
}

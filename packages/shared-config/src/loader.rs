//! Relation loader tuning

use std::time::Duration;

use crate::{parse_env, parse_flag, ConfigResult};

/// How GraphQL relation fields are resolved
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoaderConfig {
    /// Resolve relations through per-request batching (`USE_DATALOADERS`)
    ///
    /// When off, every parent issues its own repository call.
    pub enabled: bool,

    /// Extra wait before a batch is flushed, in milliseconds (`LOADER_DELAY_MS`)
    pub delay_ms: u64,

    /// Memoise results within one request (`LOADER_CACHE`)
    pub cache: bool,
}

impl LoaderConfig {
    pub fn from_env() -> ConfigResult<Self> {
        Ok(Self {
            enabled: parse_flag("USE_DATALOADERS", true)?,
            delay_ms: parse_env("LOADER_DELAY_MS", 0)?,
            cache: parse_flag("LOADER_CACHE", true)?,
        })
    }

    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            delay_ms: 0,
            cache: true,
        }
    }
}

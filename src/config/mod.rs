//! Configuration management for the generator and the Get/Watch runtime.
//!
//! Provides hierarchical configuration loading and validation with:
//! - Default values as code base
//! - Configuration file support
//! - Environment variable overrides
mod client;
mod codegen;
mod watch;
pub use client::*;
pub use codegen::*;
pub use watch::*;


use std::env;

use config::Config;
use config::Environment;
use config::File;
use serde::Deserialize;
use serde::Serialize;

use crate::Result;

/// Environment variable naming an optional configuration file
pub const CONFIG_PATH_ENV: &str = "GETWATCH_CONFIG";

/// Prefix of environment overrides, e.g. `GETWATCH__CLIENT__REQUEST_TIMEOUT_IN_MS`
const ENV_PREFIX: &str = "GETWATCH";

/// Main configuration container
///
/// Combines all subsystem configurations with hierarchical override support:
/// 1. Default values from code implementation
/// 2. Configuration file specified by `GETWATCH_CONFIG`
/// 3. Environment variables (highest priority)
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct GetwatchConfig {
    /// Generator settings: target resolution and paths used in rendered code
    #[serde(default)]
    pub codegen: CodegenConfig,
    /// Client-side runtime settings
    #[serde(default)]
    pub client: ClientConfig,
    /// Server-side Watch runtime settings
    #[serde(default)]
    pub watch: WatchConfig,
}

impl GetwatchConfig {
    /// Loads configuration from hierarchical sources without validation.
    ///
    /// Sources are merged in the following order (later sources override earlier):
    /// 1. Type defaults (lowest priority)
    /// 2. Configuration file from `GETWATCH_CONFIG` environment variable (if set)
    /// 3. Environment variables with `GETWATCH__` prefix (highest priority)
    ///
    /// Callers should call [`validate`](Self::validate) before use.
    pub fn new() -> Result<Self> {
        let mut builder = Config::builder().add_source(Config::try_from(&Self::default())?);

        if let Ok(config_path) = env::var(CONFIG_PATH_ENV) {
            builder = builder.add_source(File::with_name(&config_path).required(true));
        }

        builder = builder.add_source(env_source());

        let config: Self = builder.build()?.try_deserialize()?;
        Ok(config)
    }

    /// Applies additional configuration overrides from file without validation.
    ///
    /// Merging order (later sources override earlier):
    /// 1. Current configuration values
    /// 2. New configuration file
    /// 3. Latest environment variables (highest priority)
    pub fn with_override_config(
        &self,
        path: &str,
    ) -> Result<Self> {
        let config: Self = Config::builder()
            .add_source(Config::try_from(self)?)
            .add_source(File::with_name(path))
            .add_source(env_source())
            .build()?
            .try_deserialize()?;
        Ok(config)
    }

    /// Validates every section and returns the validated instance.
    pub fn validate(self) -> Result<Self> {
        self.codegen.validate()?;
        self.client.validate()?;
        self.watch.validate()?;
        Ok(self)
    }
}

fn env_source() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .separator("__")
        .ignore_empty(true)
        .try_parsing(true)
}

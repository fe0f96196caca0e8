//! Configuration Loader
//!
//! Environment-aware settings loading. Values are layered in this order, later
//! layers winning:
//!
//! 1. built-in defaults
//! 2. `<config dir>/scs.toml`
//! 3. `<config dir>/scs.<environment>.toml`
//! 4. `SCS_*` environment variables (`SCS_CACHE_LIMIT`, `SCS_DISPATCH__WORKER_THREADS`)
//!
//! Both files are optional. The merged result is validated before it is returned.

use ::config::{Config, Environment, File, FileFormat};
use std::env;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::CacheSettings;
use crate::constants::env::{
    BASE_FILE_STEM, CONFIG_DIR_VAR, DEFAULT_CONFIG_DIR, DEFAULT_ENVIRONMENT, ENVIRONMENT_VARS,
    ENV_PREFIX,
};
use crate::constants::DEBUG_IDENTIFIER;
use crate::error::Result;
use crate::state_machine::CacheMode;

/// Builder-style loader for [`CacheSettings`]
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    config_directory: PathBuf,
    environment: String,
    env_prefix: Option<String>,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// Loader using the detected environment and default config directory
    pub fn new() -> Self {
        Self {
            config_directory: Self::default_config_directory(),
            environment: Self::detect_environment(),
            env_prefix: Some(ENV_PREFIX.to_string()),
        }
    }

    pub fn with_directory(mut self, directory: impl Into<PathBuf>) -> Self {
        self.config_directory = directory.into();
        self
    }

    /// Use an explicit environment instead of the detected one.
    /// This is useful for testing without modifying global environment variables.
    pub fn with_environment(mut self, environment: impl Into<String>) -> Self {
        self.environment = environment.into();
        self
    }

    pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = Some(prefix.into());
        self
    }

    pub fn without_env_overrides(mut self) -> Self {
        self.env_prefix = None;
        self
    }

    pub fn environment(&self) -> &str {
        &self.environment
    }

    pub fn config_directory(&self) -> &Path {
        &self.config_directory
    }

    pub fn base_file(&self) -> PathBuf {
        self.config_directory.join(format!("{BASE_FILE_STEM}.toml"))
    }

    pub fn environment_file(&self) -> PathBuf {
        self.config_directory
            .join(format!("{BASE_FILE_STEM}.{}.toml", self.environment))
    }

    /// Detect the current environment from environment variables
    pub fn detect_environment() -> String {
        Self::detect_environment_from(|key| env::var(key).ok())
    }

    fn detect_environment_from(lookup: impl Fn(&str) -> Option<String>) -> String {
        ENVIRONMENT_VARS
            .iter()
            .filter_map(|key| lookup(key))
            .map(|value| value.trim().to_string())
            .find(|value| !value.is_empty())
            .unwrap_or_else(|| DEFAULT_ENVIRONMENT.to_string())
    }

    pub fn default_config_directory() -> PathBuf {
        env::var(CONFIG_DIR_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_DIR))
    }

    /// Load, merge, and validate settings
    pub fn load(&self) -> Result<CacheSettings> {
        let base_file = self.base_file();
        let environment_file = self.environment_file();

        debug!(
            environment = %self.environment,
            directory = %self.config_directory.display(),
            "{DEBUG_IDENTIFIER} loading cache settings"
        );

        let mut builder = Config::builder()
            .add_source(File::new(&base_file.to_string_lossy(), FileFormat::Toml).required(false))
            .add_source(
                File::new(&environment_file.to_string_lossy(), FileFormat::Toml).required(false),
            );

        if let Some(prefix) = &self.env_prefix {
            builder = builder.add_source(
                Environment::with_prefix(prefix)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            );
        }

        let merged = builder.build()?;

        // unknown modes are a validation failure, not a load failure
        if let Ok(mode) = merged.get_string("cache_mode") {
            mode.parse::<CacheMode>()?;
        }

        let settings: CacheSettings = merged.try_deserialize()?;
        settings.validate()?;

        debug!(
            "{DEBUG_IDENTIFIER} cache settings: {}",
            serde_json::to_string(&settings).unwrap_or_else(|_| "[serialization error]".to_string())
        );
        info!(
            environment = %self.environment,
            cache_limit = settings.cache_limit,
            cache_mode = %settings.cache_mode,
            debug_mode = settings.debug_mode,
            "{DEBUG_IDENTIFIER} cache settings loaded"
        );

        Ok(settings)
    }
}

//! Configuration loader with layered merging.
//!
//! # Load Order
//!
//! 1. Default values (compile-time)
//! 2. Config file (`tessel.toml` unless overridden; a missing file is ignored)
//! 3. Environment variables (`TESSEL_*`)
//!
//! Each layer overrides the previous.

use super::{ConfigError, ExtensionConfig, CONFIG_FILE};
use crate::FailurePolicy;
use std::path::{Path, PathBuf};
use tracing::debug;

const ENV_DEFAULT_EXTENSIONS: &str = "TESSEL_DEFAULT_EXTENSIONS";
const ENV_DISPATCH_FORWARD: &str = "TESSEL_DISPATCH_FORWARD";
const ENV_DISPATCH_BACKWARD: &str = "TESSEL_DISPATCH_BACKWARD";

/// Configuration loader with builder pattern.
///
/// # Example
///
/// ```no_run
/// use tessel_extension::config::ConfigLoader;
///
/// let config = ConfigLoader::new()
///     .with_config_file("tessel.toml")
///     .skip_env_vars()
///     .load()?;
/// let dispatcher = config.dispatcher();
/// # Ok::<(), tessel_extension::config::ConfigError>(())
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    /// Config file path.
    config_path: PathBuf,

    /// Skip environment variable loading.
    skip_env: bool,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self {
            config_path: PathBuf::from(CONFIG_FILE),
            skip_env: false,
        }
    }
}

impl ConfigLoader {
    /// Creates a loader reading [`CONFIG_FILE`] from the working directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the config file to load.
    #[must_use]
    pub fn with_config_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_path = path.into();
        self
    }

    /// Returns the config file this loader reads.
    #[must_use]
    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Skips environment variable loading.
    ///
    /// Useful for testing with deterministic config.
    #[must_use]
    pub fn skip_env_vars(mut self) -> Self {
        self.skip_env = true;
        self
    }

    /// Loads and merges configuration from all sources.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the config file exists but cannot be
    /// read or parsed, or an environment variable holds an invalid value.
    pub fn load(&self) -> Result<ExtensionConfig, ConfigError> {
        let mut config = ExtensionConfig::default();

        if let Some(file_config) = load_file(&self.config_path)? {
            debug!(path = %self.config_path.display(), "Loaded extension config");
            config.merge(&file_config);
        }

        if !self.skip_env {
            apply_env(&mut config, |name| std::env::var(name).ok())?;
        }

        Ok(config)
    }
}

/// Loads a config file, returning None if it doesn't exist.
fn load_file(path: &Path) -> Result<Option<ExtensionConfig>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }

    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
    let config =
        ExtensionConfig::from_toml(&content).map_err(|e| ConfigError::parse_toml(path, e))?;

    Ok(Some(config))
}

/// Applies environment overrides read through `var`.
fn apply_env(
    config: &mut ExtensionConfig,
    var: impl Fn(&str) -> Option<String>,
) -> Result<(), ConfigError> {
    if let Some(val) = var(ENV_DEFAULT_EXTENSIONS) {
        config.default_extensions = val
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect();
        debug!(var = ENV_DEFAULT_EXTENSIONS, "Applied env override");
    }

    if let Some(val) = var(ENV_DISPATCH_FORWARD) {
        config.dispatch.forward = parse_policy(ENV_DISPATCH_FORWARD, &val)?;
    }
    if let Some(val) = var(ENV_DISPATCH_BACKWARD) {
        config.dispatch.backward = parse_policy(ENV_DISPATCH_BACKWARD, &val)?;
    }

    Ok(())
}

/// Parses a failure policy (case-insensitive).
fn parse_policy(name: &str, value: &str) -> Result<FailurePolicy, ConfigError> {
    value
        .trim()
        .to_lowercase()
        .parse::<FailurePolicy>()
        .map_err(|e| ConfigError::invalid_env_var(name, e.to_string()))
}

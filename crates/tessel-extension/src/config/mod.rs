//! Extension configuration with layered loading.
//!
//! Configures the default extension set seeded into root registries
//! and the dispatch failure policies.
//!
//! ```text
//! Priority (highest to lowest):
//!
//! ┌──────────────────────────────────────────┐
//! │  1. Environment Variables (TESSEL_*)     │
//! ├──────────────────────────────────────────┤
//! │  2. Config file (tessel.toml)            │
//! ├──────────────────────────────────────────┤
//! │  3. Default Values (compile-time)        │
//! └──────────────────────────────────────────┘
//! ```
//!
//! # Environment Variables
//!
//! | Variable | Config Field | Values |
//! |----------|--------------|--------|
//! | `TESSEL_DEFAULT_EXTENSIONS` | `default_extensions` | comma-separated `namespace::name` |
//! | `TESSEL_DISPATCH_FORWARD` | `dispatch.forward` | `fail_fast`, `aggregate` |
//! | `TESSEL_DISPATCH_BACKWARD` | `dispatch.backward` | `fail_fast`, `aggregate` |
//!
//! # Example Configuration
//!
//! ```toml
//! default_extensions = [
//!     "builtin::disabled_condition",
//!     "builtin::test_info_resolver",
//! ]
//!
//! [dispatch]
//! forward = "fail_fast"
//! backward = "aggregate"
//! ```

mod error;
mod loader;

pub use error::ConfigError;
pub use loader::ConfigLoader;

use crate::builtins::default_extension_types;
use crate::{Dispatcher, FailurePolicy};
use serde::{Deserialize, Serialize};
use tessel_types::ExtensionTypeId;

/// Default config file name.
pub const CONFIG_FILE: &str = "tessel.toml";

/// Top-level extension configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ExtensionConfig {
    /// Extension types seeded into every root registry, in order.
    pub default_extensions: Vec<String>,

    /// Dispatch failure policies.
    pub dispatch: DispatchConfig,
}

impl Default for ExtensionConfig {
    fn default() -> Self {
        Self {
            default_extensions: default_extension_types()
                .iter()
                .map(ExtensionTypeId::fqn)
                .collect(),
            dispatch: DispatchConfig::default(),
        }
    }
}

impl ExtensionConfig {
    /// Merges another config into this one.
    ///
    /// Fields of `other` that differ from the defaults override this
    /// config's values.
    pub fn merge(&mut self, other: &Self) {
        let default = Self::default();

        if other.default_extensions != default.default_extensions {
            self.default_extensions = other.default_extensions.clone();
        }
        self.dispatch.merge(&other.dispatch);
    }

    /// Validates every default extension name.
    ///
    /// Returns all validation errors (not just the first one).
    pub fn validate_all(&self) -> Vec<ConfigError> {
        self.default_extensions
            .iter()
            .filter(|value| ExtensionTypeId::parse(value).is_none())
            .map(|value| ConfigError::InvalidExtensionType {
                value: value.clone(),
            })
            .collect()
    }

    /// Parses the default extension set.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidExtensionType`] for the first
    /// entry that is not a `namespace::name` type.
    pub fn default_extension_types(&self) -> Result<Vec<ExtensionTypeId>, ConfigError> {
        self.default_extensions
            .iter()
            .map(|value| {
                ExtensionTypeId::parse(value).ok_or_else(|| ConfigError::InvalidExtensionType {
                    value: value.clone(),
                })
            })
            .collect()
    }

    /// Builds the dispatcher described by `[dispatch]`.
    #[must_use]
    pub fn dispatcher(&self) -> Dispatcher {
        Dispatcher::new(self.dispatch.forward, self.dispatch.backward)
    }

    /// Serializes to TOML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Serialize`] if serialization fails.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Deserializes from TOML string.
    ///
    /// # Errors
    ///
    /// Returns error if deserialization fails.
    pub fn from_toml(toml_str: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(toml_str)
    }
}

/// Dispatch failure policies per application direction.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct DispatchConfig {
    /// Policy for forward phases.
    pub forward: FailurePolicy,

    /// Policy for backward phases.
    pub backward: FailurePolicy,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        let dispatcher = Dispatcher::default();
        Self {
            forward: dispatcher.forward,
            backward: dispatcher.backward,
        }
    }
}

impl DispatchConfig {
    fn merge(&mut self, other: &Self) {
        let default = Self::default();

        if other.forward != default.forward {
            self.forward = other.forward;
        }
        if other.backward != default.backward {
            self.backward = other.backward;
        }
    }
}

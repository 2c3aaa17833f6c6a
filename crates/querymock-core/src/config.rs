//! Tracker configuration.
//!
//! # Examples
//!
//! ```
//! use querymock_core::config::{MockConfig, UnsettledPolicy};
//!
//! let config = MockConfig::default();
//! assert!(config.warn_on_reinstall);
//! assert_eq!(config.unsettled, UnsettledPolicy::Hang);
//! ```

use serde::{Deserialize, Serialize};

use crate::constants;
use crate::errors::ConfigError;

/// What a pending caller sees when its record is dropped without being answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnsettledPolicy {
    /// Stay pending forever. A hanging test is the signal of a missing response.
    #[default]
    Hang,
    /// Fail the caller with `QueryError::Abandoned`.
    Fail,
}

/// Configuration for a tracker instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MockConfig {
    /// Emit a warning when `install()` resets a session that is still tracking. Default: true.
    pub warn_on_reinstall: bool,
    /// Behaviour for records dropped unsettled. Default: hang.
    pub unsettled: UnsettledPolicy,
    /// Include bindings in per-query debug events. Default: false.
    pub log_bindings: bool,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            warn_on_reinstall: constants::DEFAULT_WARN_ON_REINSTALL,
            unsettled: UnsettledPolicy::default(),
            log_bindings: constants::DEFAULT_LOG_BINDINGS,
        }
    }
}

impl MockConfig {
    /// Parse a config from TOML. Missing keys take their defaults.
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        toml::from_str(input).map_err(|e| ConfigError::Parse {
            reason: e.to_string(),
        })
    }

    /// Serialize back to TOML.
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string(self).map_err(|e| ConfigError::Parse {
            reason: e.to_string(),
        })
    }
}

//! Configuration error types.
//!
//! The simulation itself never fails: unaffordable purchases, rate-limited
//! shots and actions outside `Playing` are ordinary no-ops. Errors only arise
//! when loading tuning or settings from JSON.

use std::fmt;

/// Error raised while loading or validating configuration.
#[derive(Debug)]
pub enum ConfigError {
    /// The JSON document could not be parsed.
    Parse(serde_json::Error),

    /// A value parsed fine but is outside its usable range.
    Invalid {
        /// Name of the offending field (for logging).
        field: &'static str,
        /// Human-readable description of the accepted range.
        reason: &'static str,
    },
}

impl ConfigError {
    pub(crate) fn invalid(field: &'static str, reason: &'static str) -> Self {
        ConfigError::Invalid { field, reason }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Parse(err) => write!(f, "failed to parse configuration: {err}"),
            ConfigError::Invalid { field, reason } => {
                write!(f, "invalid configuration value `{field}`: {reason}")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Parse(err) => Some(err),
            ConfigError::Invalid { .. } => None,
        }
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        ConfigError::Parse(err)
    }
}

//! Engine configuration
//!
//! Loaded from TOML:
//!
//! ```toml
//! [validator]
//! legacy_prefix_fallback = true
//! legacy_prefixes = ["pricing", "chemicalProperties"]
//! skip_hidden_requirements = true
//!
//! [cache]
//! max_capacity = 500
//! ttl_secs = 60
//! ```

use crate::error::ConfigError;
use introflow_registry::CacheConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Nested objects searched for unqualified requirement keys, in order
pub const DEFAULT_LEGACY_PREFIXES: &[&str] = &[
    "pricing",
    "chemicalProperties",
    "packaging",
    "logistics",
    "regulatory",
];

/// Submission validator behaviour
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidatorConfig {
    /// Retry unqualified keys under [`legacy_prefixes`](Self::legacy_prefixes)
    pub legacy_prefix_fallback: bool,
    /// Prefixes tried in order; first non-empty value wins
    pub legacy_prefixes: Vec<String>,
    /// Do not enforce requirements whose field is currently hidden
    pub skip_hidden_requirements: bool,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            legacy_prefix_fallback: true,
            legacy_prefixes: DEFAULT_LEGACY_PREFIXES.iter().map(ToString::to_string).collect(),
            skip_hidden_requirements: true,
        }
    }
}

impl ValidatorConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Only look up requirement keys exactly as written
    #[inline]
    #[must_use]
    pub fn strict_paths(mut self) -> Self {
        self.legacy_prefix_fallback = false;
        self
    }

    /// With custom prefix list
    #[must_use]
    pub fn with_prefixes<I, S>(mut self, prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.legacy_prefixes = prefixes.into_iter().map(Into::into).collect();
        self
    }

    /// Enforce requirements even when their field is hidden
    #[inline]
    #[must_use]
    pub fn enforce_hidden(mut self) -> Self {
        self.skip_hidden_requirements = false;
        self
    }
}

/// Top-level configuration file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Validator behaviour
    pub validator: ValidatorConfig,
    /// Registry cache sizing
    pub cache: CacheConfig,
}

impl EngineConfig {
    /// Parse from TOML text
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Read and parse a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }
}

//! Decoder configuration.
//!
//! Every field has a default, so an empty file (or no file at all) yields
//! the standard graph decoder with stock limits.
//!
//! ```toml
//! strategy = "legacy"
//! max_depth = 32
//! max_handles = 1024
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use lstasko_object_stream::DecodeLimits;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Which decoder runs once the stream header has matched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecodeStrategy {
    /// Walk the object graph and read every hashed map.
    #[default]
    Graph,
    /// Scan for the single-channel field layout of older producers.
    Legacy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DecoderConfig {
    pub strategy: DecodeStrategy,
    /// Maximum nesting depth of object contents.
    pub max_depth: usize,
    /// Maximum number of handles a single stream may assign.
    pub max_handles: usize,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        let limits = DecodeLimits::default();
        Self {
            strategy: DecodeStrategy::default(),
            max_depth: limits.max_depth,
            max_handles: limits.max_handles,
        }
    }
}

impl DecoderConfig {
    pub fn legacy() -> Self {
        Self {
            strategy: DecodeStrategy::Legacy,
            ..Self::default()
        }
    }

    /// Parses and validates TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Self::parse(text, PathBuf::from("<inline>"))
    }

    /// Reads and validates a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::parse(&contents, path.to_path_buf())
    }

    fn parse(text: &str, path: PathBuf) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text).map_err(|e| ConfigError::Parse {
            path,
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_depth == 0 {
            return Err(ConfigError::Invalid("max_depth must be at least 1".into()));
        }
        if self.max_handles == 0 {
            return Err(ConfigError::Invalid("max_handles must be at least 1".into()));
        }
        Ok(())
    }

    pub fn limits(&self) -> DecodeLimits {
        DecodeLimits {
            max_depth: self.max_depth,
            max_handles: self.max_handles,
        }
    }
}

//! Explore index configuration
//!
//! Settings can come from a TOML document, a file, or the process environment.
//! Every field has a default, so an empty document is a valid configuration.

use crate::constants::{arena, search};
use crate::error::{ExploreError, ExploreResult};
use serde::{Deserialize, Serialize};
use std::fs;
use tracing::{debug, warn};

fn default_arena_block_size() -> usize {
    arena::BLOCK_SIZE
}

fn default_max_search_len() -> usize {
    search::DEFAULT_MAX_SEARCH_LEN
}

/// Tunables for building and querying an index
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct ExploreConfig {
    /// Minimum size in bytes of each arena block
    #[serde(default = "default_arena_block_size")]
    pub arena_block_size: usize,
    /// Longest free-text search honoured, in bytes
    #[serde(default = "default_max_search_len")]
    pub max_search_len: usize,
    /// Records to reserve room for before a build starts
    #[serde(default)]
    pub initial_record_capacity: usize,
}

impl Default for ExploreConfig {
    fn default() -> Self {
        Self {
            arena_block_size: default_arena_block_size(),
            max_search_len: default_max_search_len(),
            initial_record_capacity: 0,
        }
    }
}

impl ExploreConfig {
    /// Parse and validate a TOML document
    pub fn from_toml_str(content: &str) -> ExploreResult<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML file
    pub fn from_file(path: &str) -> ExploreResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| ExploreError::io_at(path, format!("failed to read config: {e}")))?;
        debug!(path, "Loaded explore configuration file");
        Self::from_toml_str(&content)
    }

    /// Create configuration from environment variables
    ///
    /// Unset variables keep their defaults; unparseable ones are ignored with a warning.
    pub fn from_environment() -> ExploreResult<Self> {
        let mut config = Self::default();
        if let Some(v) = env_usize("EXPLORE_ARENA_BLOCK_SIZE") {
            config.arena_block_size = v;
        }
        if let Some(v) = env_usize("EXPLORE_MAX_SEARCH_LEN") {
            config.max_search_len = v;
        }
        if let Some(v) = env_usize("EXPLORE_INITIAL_RECORD_CAPACITY") {
            config.initial_record_capacity = v;
        }
        config.validate()?;
        Ok(config)
    }

    /// Check every value is within its supported range
    pub fn validate(&self) -> ExploreResult<()> {
        if self.arena_block_size < arena::MIN_BLOCK_SIZE {
            return Err(ExploreError::configuration(
                "arena_block_size",
                format!("must be at least {} bytes, got {}", arena::MIN_BLOCK_SIZE, self.arena_block_size),
            ));
        }
        if self.max_search_len == 0 {
            return Err(ExploreError::configuration("max_search_len", "must be greater than zero"));
        }
        Ok(())
    }

    /// Cut a search string down to `max_search_len` bytes on a char boundary
    pub fn clamp_search<'s>(&self, text: &'s str) -> &'s str {
        if text.len() <= self.max_search_len {
            return text;
        }
        let mut end = self.max_search_len;
        while !text.is_char_boundary(end) {
            end -= 1;
        }
        &text[..end]
    }
}

fn env_usize(name: &str) -> Option<usize> {
    let raw = std::env::var(name).ok()?;
    match raw.trim().parse() {
        Ok(v) => Some(v),
        Err(_) => {
            warn!(variable = name, value = %raw, "Ignoring unparseable configuration variable");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_uses_defaults() {
        let config = ExploreConfig::from_toml_str("").unwrap();
        assert_eq!(config, ExploreConfig::default());
        assert_eq!(config.arena_block_size, 64 * 1024);
        assert_eq!(config.max_search_len, 1023);
    }

    #[test]
    fn test_partial_document() {
        let config = ExploreConfig::from_toml_str("arena_block_size = 8192\n").unwrap();
        assert_eq!(config.arena_block_size, 8192);
        assert_eq!(config.max_search_len, 1023);
    }

    #[test]
    fn test_block_size_below_minimum_is_rejected() {
        let err = ExploreConfig::from_toml_str("arena_block_size = 16\n").unwrap_err();
        assert_eq!(err.category(), "configuration");
    }

    #[test]
    fn test_malformed_document_is_rejected() {
        assert!(ExploreConfig::from_toml_str("arena_block_size = \"big\"").is_err());
    }

    #[test]
    fn test_missing_file() {
        let err = ExploreConfig::from_file("/nonexistent/explore.toml").unwrap_err();
        assert_eq!(err.category(), "io");
    }

    #[test]
    fn test_clamp_search_respects_char_boundary() {
        let config = ExploreConfig { max_search_len: 4, ..ExploreConfig::default() };
        assert_eq!(config.clamp_search("mario"), "mari");
        assert_eq!(config.clamp_search("abcé"), "abc");
        assert_eq!(config.clamp_search("ab"), "ab");
    }
}

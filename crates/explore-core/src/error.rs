//! Error handling for the explore index
//!
//! Malformed input and unavailable databases are absorbed where they are
//! detected and never reach callers. What remains here is what a caller can
//! actually observe: allocation failure during a build, and configuration
//! problems.

use std::fmt;
use thiserror::Error;

/// Error type for explore index operations
#[derive(Error, Debug, Clone)]
pub enum ExploreError {
    /// Memory could not be reserved; the build is abandoned
    #[error("Memory error: {component} could not reserve {requested} more elements")]
    Memory { component: &'static str, requested: usize },

    /// Configuration value out of range or unparseable
    #[error("Configuration error: {setting}: {message}")]
    Configuration { setting: String, message: String },

    /// Configuration file could not be read
    #[error("I/O error: {message}")]
    Io { message: String, path: Option<String> },
}

impl ExploreError {
    /// Get the error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            ExploreError::Memory { .. } => "memory",
            ExploreError::Configuration { .. } => "configuration",
            ExploreError::Io { .. } => "io",
        }
    }

    /// Get the error severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            ExploreError::Memory { .. } => ErrorSeverity::Critical,
            ExploreError::Configuration { .. } => ErrorSeverity::High,
            ExploreError::Io { .. } => ErrorSeverity::Medium,
        }
    }

    /// Check if this error is recoverable
    pub fn is_recoverable(&self) -> bool {
        match self {
            ExploreError::Memory { .. } => false, // build state is discarded
            ExploreError::Configuration { .. } => false,
            ExploreError::Io { .. } => true,
        }
    }

    /// Create a memory reservation error
    pub fn memory(component: &'static str, requested: usize) -> Self {
        Self::Memory { component, requested }
    }

    /// Create a configuration error
    pub fn configuration(setting: &str, message: impl Into<String>) -> Self {
        Self::Configuration { setting: setting.to_string(), message: message.into() }
    }

    /// Create an I/O error tied to a path
    pub fn io_at(path: &str, message: impl Into<String>) -> Self {
        Self::Io { message: message.into(), path: Some(path.to_string()) }
    }
}

/// Error severity levels for logging
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorSeverity::Low => write!(f, "LOW"),
            ErrorSeverity::Medium => write!(f, "MEDIUM"),
            ErrorSeverity::High => write!(f, "HIGH"),
            ErrorSeverity::Critical => write!(f, "CRITICAL"),
        }
    }
}

/// Result type alias for explore operations
pub type ExploreResult<T> = Result<T, ExploreError>;

impl From<std::io::Error> for ExploreError {
    fn from(err: std::io::Error) -> Self {
        ExploreError::Io { message: format!("I/O error: {err}"), path: None }
    }
}

impl From<toml::de::Error> for ExploreError {
    fn from(err: toml::de::Error) -> Self {
        ExploreError::configuration("toml", err.message().to_string())
    }
}

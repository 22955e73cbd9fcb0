//! Error types for `TabDeck`
//!
//! Layout and eviction operations never fail; they report what happened
//! through outcome enums. Errors are reserved for the edges: reading and
//! writing settings, validating them, and installing the log subscriber.

use std::path::PathBuf;

use thiserror::Error;

use crate::split::SplitError;
use crate::tracing::TracingError;

/// Errors raised while loading, validating or saving settings
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Settings file could not be read
    #[error("Failed to read settings from {path}: {reason}")]
    Read {
        /// File that was read
        path: PathBuf,
        /// Underlying I/O failure
        reason: String,
    },

    /// Settings file could not be written
    #[error("Failed to write settings: {0}")]
    Write(String),

    /// Settings file is not valid TOML for [`AppSettings`](crate::config::AppSettings)
    #[error("Failed to parse settings: {0}")]
    Parse(String),

    /// Settings could not be serialized
    #[error("Failed to serialize settings: {0}")]
    Serialize(String),

    /// A setting holds a value outside its allowed range
    #[error("Invalid value for {field}: {reason}")]
    Validation {
        /// Dotted path of the offending field
        field: String,
        /// What is wrong with it
        reason: String,
    },
}

/// Result type for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Umbrella error for embedding applications
#[derive(Debug, Error)]
pub enum TabDeckError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Logging setup error
    #[error("Logging error: {0}")]
    Tracing(#[from] TracingError),

    /// Split layout setup error
    #[error("Split layout error: {0}")]
    Split(#[from] SplitError),
}

/// Result type for fallible `TabDeck` operations
pub type Result<T> = std::result::Result<T, TabDeckError>;

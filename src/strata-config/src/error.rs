//! Error types for strata-config.

use std::path::PathBuf;
use thiserror::Error;

/// Configuration error types.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// IO error during file operations.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Could not determine a home/config directory.
    #[error("could not determine config directory")]
    ConfigDirNotFound,

    /// Parent directory of the config file could not be created.
    #[error("cannot create config directory {0}")]
    CreateDir(PathBuf),
}

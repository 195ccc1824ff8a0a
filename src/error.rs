use std::io::Error;

use polars::error::PolarsError;
use thiserror::Error as ThisError;

/// Errors raised while loading data, persisting favorites or driving the terminal.
#[derive(Debug, ThisError)]
pub enum ScoutError {
    #[error("io error: {0}")]
    IoError(#[from] Error),

    #[error("failed to parse table: {0}")]
    PolarsError(#[from] PolarsError),

    #[error("invalid json: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("loading failed: {0}")]
    LoadingFailed(String),

    #[error("file not found: {0}")]
    FileNotFound(String),

    #[error("permission denied: {0}")]
    PermissionDenied(String),

    #[error("invalid path '{path}': {reason}")]
    InvalidPath { path: String, reason: String },

    #[error("unknown formation '{0}'")]
    UnknownFormation(String),

    #[error("unknown category '{0}'")]
    UnknownCategory(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("storage error: {0}")]
    Storage(String),
}

pub type Result<T> = std::result::Result<T, ScoutError>;

//! Error types for store persistence

use std::path::PathBuf;
use thiserror::Error;

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur while reading or writing a store
#[derive(Debug, Error)]
pub enum StoreError {
    /// Failed to read store file
    #[error("Failed to read store at {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to write store file
    #[error("Failed to write store at {path}: {source}")]
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Store file exists but holds no data
    #[error("Store at {path} is empty")]
    Empty { path: PathBuf },

    /// Failed to parse store file
    #[error("Failed to parse store at {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// Failed to serialize an aggregate
    #[error("Failed to serialize store: {0}")]
    SerializeError(#[from] serde_json::Error),

    /// Failed to create the store directory
    #[error("Failed to create store directory at {path}: {source}")]
    DirectoryCreationError {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to copy the previous store aside
    #[error("Failed to backup store file: {source}")]
    BackupError { source: std::io::Error },

    /// Generic I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

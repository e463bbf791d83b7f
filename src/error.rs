//! Error types
//!
//! `StorageError` covers failures reported by a storage client. `ApiError` is
//! what session, queue and tooling operations return.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Node not found: {0}")]
    NotFound(String),

    #[error("Not a directory: {0}")]
    NotADirectory(String),

    #[error("Item already exists: {0}")]
    AlreadyExists(String),

    #[error("Unknown CID: {0}")]
    UnknownCid(String),

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("Transfer failed: {0}")]
    Transfer(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("No files pending upload")]
    QueueEmpty,

    #[error("No storage client bound")]
    StorageNotBound,

    #[error("Upload of record {index} failed: {source}")]
    UploadFailed {
        index: usize,
        #[source]
        source: StorageError,
    },

    #[error("Upload cancelled")]
    Cancelled,

    #[error("Read-only view: {0}")]
    ReadOnly(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Invalid handler pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

//! Error types for the notes tree.

use crate::types::NodeId;
use std::path::PathBuf;
use thiserror::Error;

/// Failures of the persistence collaborators (record store, metadata store).
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("sled error: {0}")]
    Sled(#[from] sled::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("corrupt record {key}: {reason}")]
    Corrupt { key: String, reason: String },
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        StorageError::Serialization(err.to_string())
    }
}

impl From<bincode::Error> for StorageError {
    fn from(err: bincode::Error) -> Self {
        StorageError::Serialization(err.to_string())
    }
}

/// Errors surfaced by `NotesTreeStore` operations.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("node not found: {0}")]
    NodeNotFound(NodeId),

    #[error("name already exists: {0}")]
    NameConflict(String),

    #[error("invalid operation: {0}")]
    InvalidOperation(String),

    #[error("invalid parent {0}: parent must be an existing folder")]
    InvalidParent(NodeId),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("configuration error: {0}")]
    ConfigError(String),

    #[error("unsupported in {mode} mode: {operation}")]
    Unsupported { mode: String, operation: String },
}

impl ApiError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ApiError::Io {
            path: path.into(),
            source,
        }
    }
}

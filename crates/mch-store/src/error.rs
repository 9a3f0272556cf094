//! Store error types.

use std::path::PathBuf;
use thiserror::Error;

/// Store operation error.
#[derive(Debug, Error)]
pub enum StoreError {
    /// File I/O error.
    #[error("Failed to {operation} {path}")]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Atomic write failed (temp file couldn't be renamed).
    #[error("Failed to replace {target_path}")]
    AtomicWriteFailed {
        temp_path: PathBuf,
        target_path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A collection file exists but is not a valid collection.
    #[error("Collection file {path} is unreadable")]
    Deserialization {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to serialize a document for collection '{collection}'")]
    Serialization {
        collection: String,
        #[source]
        source: serde_json::Error,
    },

    /// Collection names become file names, so only `[A-Za-z0-9_-]` is allowed.
    #[error("Invalid collection name '{name}'")]
    InvalidCollectionName { name: String },

    /// The record did not serialize to a JSON object.
    #[error("Documents in '{collection}' must be JSON objects")]
    NotAnObject { collection: String },

    /// The document has no string value for the upsert key.
    #[error("Document in '{collection}' has no string '{key}' field")]
    MissingKey { collection: String, key: String },

    /// A write would give two documents the same value for a unique field.
    #[error("Duplicate value '{value}' for unique field '{field}' in '{collection}'")]
    DuplicateKey {
        collection: String,
        field: String,
        value: String,
    },
}

impl StoreError {
    pub(crate) fn io(operation: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            operation,
            path: path.into(),
            source,
        }
    }
}

/// Result type alias for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

//! Store and service errors

use std::path::PathBuf;

use thiserror::Error;
use wellseries_core::QueryError;

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Loading or writing a series file failed
#[derive(Error, Debug)]
pub enum StoreError {
    /// File does not exist
    #[error("data file not found: {}", .0.display())]
    NotFound(PathBuf),

    /// Any other I/O failure
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        /// File involved
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Content is not valid JSON
    #[error("malformed JSON in {}: {source}", path.display())]
    Malformed {
        /// File involved
        path: PathBuf,
        /// Parser error
        #[source]
        source: serde_json::Error,
    },

    /// Top-level JSON value is not an array
    #[error("expected a JSON array of records in {}", .0.display())]
    NotAnArray(PathBuf),

    /// Snapshot lock poisoned by a panicking writer
    #[error("snapshot lock poisoned")]
    LockPoisoned,
}

impl StoreError {
    /// Map an I/O error, keeping `NotFound` distinct
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            StoreError::NotFound(path)
        } else {
            StoreError::Io { path, source }
        }
    }
}

/// Request-level failure
#[derive(Error, Debug)]
pub enum ServiceError {
    /// Bad query parameter
    #[error(transparent)]
    Query(#[from] QueryError),

    /// No data could be loaded
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ServiceError {
    /// True when the caller sent a bad request rather than the data being missing
    pub fn is_client_error(&self) -> bool {
        matches!(self, ServiceError::Query(_))
    }
}

//! Error types for schedsync.

use std::fmt;

use thiserror::Error;

/// Which collection a bulk fetch was reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Source,
    Target,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Source => write!(f, "source"),
            Side::Target => write!(f, "target"),
        }
    }
}

/// Errors that can occur in schedsync operations.
#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to fetch {side} collection: {message}")]
    BulkFetch { side: Side, message: String },

    #[error("Invalid date range: {0}")]
    InvalidRange(String),

    #[error(transparent)]
    RemoteWrite(#[from] RemoteWriteError),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl SyncError {
    pub fn bulk_fetch(side: Side, message: impl Into<String>) -> Self {
        SyncError::BulkFetch {
            side,
            message: message.into(),
        }
    }
}

/// A single create/update/delete/back-link call that did not go through.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RemoteWriteError {
    #[error("Remote object not found: {0}")]
    NotFound(String),

    #[error("Remote write failed: {0}")]
    Failed(String),
}

/// Result type alias for schedsync operations.
pub type SyncResult<T> = Result<T, SyncError>;

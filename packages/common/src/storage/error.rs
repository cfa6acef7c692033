use std::fmt;

use thiserror::Error;

/// Errors that can occur during blob storage operations.
#[derive(Debug)]
pub enum StorageError {
    /// No blob is stored under the requested key.
    NotFound(String),
    /// A blob is already stored under the key. Keys are never overwritten in place.
    AlreadyExists(String),
    /// An I/O error occurred.
    Io(std::io::Error),
    /// The blob exceeds the configured size limit.
    SizeLimitExceeded { actual: u64, limit: u64 },
    /// The reassembled blob does not match its recorded length.
    Incomplete {
        key: String,
        expected: u64,
        actual: u64,
    },
    /// Stored blob metadata could not be read back.
    Corrupt { key: String, reason: String },
    /// The storage backend reported an error.
    Backend(String),
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound(key) => write!(f, "blob not found: {key}"),
            Self::AlreadyExists(key) => write!(f, "blob already exists: {key}"),
            Self::Io(err) => write!(f, "storage IO error: {err}"),
            Self::SizeLimitExceeded { actual, limit } => {
                write!(f, "blob exceeds size limit ({actual} > {limit} bytes)")
            }
            Self::Incomplete {
                key,
                expected,
                actual,
            } => write!(
                f,
                "blob {key} is incomplete ({actual} of {expected} bytes)"
            ),
            Self::Corrupt { key, reason } => write!(f, "blob {key} is corrupt: {reason}"),
            Self::Backend(msg) => write!(f, "storage backend error: {msg}"),
        }
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for StorageError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

#[cfg(feature = "sea-orm")]
impl From<sea_orm::DbErr> for StorageError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Backend(err.to_string())
    }
}

/// Errors produced by the hash engine.
#[derive(Debug, Error)]
pub enum HashError {
    /// A hex digest could not be parsed.
    #[error("invalid content hash: {0}")]
    Invalid(String),
    /// The digest task failed before producing a result.
    #[error("digest computation failed: {0}")]
    Compute(String),
}

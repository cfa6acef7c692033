use std::time::Duration;

use common::catalogue::CatalogueStoreError;
use common::storage::{HashError, StorageError};
use thiserror::Error;

/// A fault in one of the stores or in the hash engine.
#[derive(Debug, Error)]
pub enum StoreFailure {
    #[error(transparent)]
    Catalogue(#[from] CatalogueStoreError),

    #[error(transparent)]
    Blob(#[from] StorageError),

    #[error(transparent)]
    Hash(#[from] HashError),

    /// The call did not finish in time. Its side effects are unknown.
    #[error("{operation} timed out after {limit:?}")]
    Timeout {
        operation: &'static str,
        limit: Duration,
    },
}

/// Outcome of a catalogue operation that did not succeed.
#[derive(Debug, Error)]
pub enum CatalogueError {
    /// No readable video under this id.
    #[error("video {0} not found")]
    NotFound(String),

    /// Byte-identical content is already catalogued.
    #[error("duplicate content, already stored as {existing_id}")]
    DuplicateContent { existing_id: String },

    #[error("store failure: {0}")]
    StoreFailure(#[from] StoreFailure),
}

impl From<CatalogueStoreError> for CatalogueError {
    fn from(err: CatalogueStoreError) -> Self {
        Self::StoreFailure(err.into())
    }
}

impl From<StorageError> for CatalogueError {
    fn from(err: StorageError) -> Self {
        Self::StoreFailure(err.into())
    }
}

impl From<HashError> for CatalogueError {
    fn from(err: HashError) -> Self {
        Self::StoreFailure(err.into())
    }
}

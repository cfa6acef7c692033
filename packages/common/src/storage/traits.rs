use std::fmt;

use async_trait::async_trait;

use super::error::StorageError;

/// Address of a blob: the catalogue record id plus the original filename.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BlobKey {
    id: String,
    name: String,
}

impl BlobKey {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Flat storage key, `{id}_{name}`.
    pub fn storage_key(&self) -> String {
        format!("{}_{}", self.id, self.name)
    }
}

impl fmt::Display for BlobKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.id, self.name)
    }
}

/// Chunked blob storage addressed by [`BlobKey`].
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store `data` as one logical object and return the number of bytes written.
    ///
    /// Fails with [`StorageError::AlreadyExists`] if the key is taken.
    async fn upload(&self, key: &BlobKey, data: &[u8]) -> Result<u64, StorageError>;

    /// Retrieve the entire object.
    async fn download(&self, key: &BlobKey) -> Result<Vec<u8>, StorageError>;

    /// Delete an object.
    ///
    /// Returns `true` if the object was deleted, `false` if it did not exist.
    async fn delete(&self, key: &BlobKey) -> Result<bool, StorageError>;

    /// Check whether an object exists.
    async fn exists(&self, key: &BlobKey) -> Result<bool, StorageError>;
}

/// Reject payloads larger than `limit`.
pub fn ensure_within_limit(len: usize, limit: u64) -> Result<(), StorageError> {
    let actual = len as u64;
    if actual > limit {
        return Err(StorageError::SizeLimitExceeded { actual, limit });
    }
    Ok(())
}

/// Check a reassembled payload against its recorded length.
pub fn ensure_complete(key: &BlobKey, expected: u64, actual: usize) -> Result<(), StorageError> {
    if expected != actual as u64 {
        return Err(StorageError::Incomplete {
            key: key.storage_key(),
            expected,
            actual: actual as u64,
        });
    }
    Ok(())
}

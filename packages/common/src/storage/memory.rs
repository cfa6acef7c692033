use async_trait::async_trait;
use bytes::Bytes;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use super::error::StorageError;
use super::traits::{BlobKey, BlobStore, ensure_complete, ensure_within_limit};
use crate::config::{BlobStoreConfig, DEFAULT_CHUNK_SIZE};

struct StoredBlob {
    length: u64,
    chunks: Vec<Bytes>,
}

/// In-process chunked blob store.
pub struct MemoryBlobStore {
    blobs: DashMap<String, StoredBlob>,
    chunk_size: usize,
    max_size: u64,
}

impl MemoryBlobStore {
    pub fn new(chunk_size: usize, max_size: u64) -> Self {
        Self {
            blobs: DashMap::new(),
            chunk_size: chunk_size.max(1),
            max_size,
        }
    }

    pub fn from_config(config: &BlobStoreConfig) -> Self {
        Self::new(config.chunk_size, config.max_size)
    }

    /// Number of stored blobs.
    pub fn len(&self) -> usize {
        self.blobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blobs.is_empty()
    }
}

impl Default for MemoryBlobStore {
    fn default() -> Self {
        Self::new(DEFAULT_CHUNK_SIZE, u64::MAX)
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn upload(&self, key: &BlobKey, data: &[u8]) -> Result<u64, StorageError> {
        ensure_within_limit(data.len(), self.max_size)?;

        match self.blobs.entry(key.storage_key()) {
            Entry::Occupied(_) => Err(StorageError::AlreadyExists(key.storage_key())),
            Entry::Vacant(slot) => {
                let chunks = data
                    .chunks(self.chunk_size)
                    .map(Bytes::copy_from_slice)
                    .collect();
                slot.insert(StoredBlob {
                    length: data.len() as u64,
                    chunks,
                });
                Ok(data.len() as u64)
            }
        }
    }

    async fn download(&self, key: &BlobKey) -> Result<Vec<u8>, StorageError> {
        let blob = self
            .blobs
            .get(&key.storage_key())
            .ok_or_else(|| StorageError::NotFound(key.storage_key()))?;

        let mut buf = Vec::with_capacity(blob.length as usize);
        for chunk in &blob.chunks {
            buf.extend_from_slice(chunk);
        }
        ensure_complete(key, blob.length, buf.len())?;
        Ok(buf)
    }

    async fn delete(&self, key: &BlobKey) -> Result<bool, StorageError> {
        Ok(self.blobs.remove(&key.storage_key()).is_some())
    }

    async fn exists(&self, key: &BlobKey) -> Result<bool, StorageError> {
        Ok(self.blobs.contains_key(&key.storage_key()))
    }
}

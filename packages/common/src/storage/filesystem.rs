use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::fs;

use super::error::StorageError;
use super::hash::{ContentHash, DigestAlgorithm};
use super::traits::{BlobKey, BlobStore, ensure_complete, ensure_within_limit};
use crate::config::BlobStoreConfig;

const MANIFEST_FILE: &str = "manifest.json";

/// Written last, so a directory without one was never fully uploaded.
#[derive(Debug, Serialize, Deserialize)]
struct BlobManifest {
    key: String,
    length: u64,
    chunk_size: usize,
    chunk_count: usize,
}

/// Filesystem-backed chunked blob store.
///
/// Each blob is a directory in a Git-style sharded layout keyed by the
/// SHA-256 of its storage key:
/// `{base_path}/{first 2 hex chars}/{remaining 62 hex chars}/`
/// holding `chunk-000000`, `chunk-000001`, ... and a `manifest.json`.
pub struct FilesystemBlobStore {
    base_path: PathBuf,
    chunk_size: usize,
    max_size: u64,
}

impl FilesystemBlobStore {
    /// Create a new filesystem blob store.
    pub async fn new(
        base_path: PathBuf,
        chunk_size: usize,
        max_size: u64,
    ) -> Result<Self, StorageError> {
        fs::create_dir_all(&base_path).await?;
        fs::create_dir_all(base_path.join(".tmp")).await?;
        Ok(Self {
            base_path,
            chunk_size: chunk_size.max(1),
            max_size,
        })
    }

    pub async fn from_config(config: &BlobStoreConfig) -> Result<Self, StorageError> {
        Self::new(
            config.filesystem_root.clone(),
            config.chunk_size,
            config.max_size,
        )
        .await
    }

    /// Directory holding the chunks of a blob.
    fn blob_dir(&self, key: &BlobKey) -> PathBuf {
        let hash = ContentHash::compute(DigestAlgorithm::Sha256, key.storage_key().as_bytes());
        self.base_path
            .join(hash.shard_prefix())
            .join(hash.shard_suffix())
    }

    /// Path for a temporary directory during writes.
    fn temp_dir(&self) -> PathBuf {
        self.base_path
            .join(".tmp")
            .join(uuid::Uuid::new_v4().to_string())
    }

    fn chunk_path(dir: &Path, n: usize) -> PathBuf {
        dir.join(format!("chunk-{n:06}"))
    }

    async fn write_chunks(&self, dir: &Path, key: &BlobKey, data: &[u8]) -> Result<(), StorageError> {
        fs::create_dir_all(dir).await?;

        let mut chunk_count = 0;
        for (n, chunk) in data.chunks(self.chunk_size).enumerate() {
            fs::write(Self::chunk_path(dir, n), chunk).await?;
            chunk_count += 1;
        }

        let manifest = BlobManifest {
            key: key.storage_key(),
            length: data.len() as u64,
            chunk_size: self.chunk_size,
            chunk_count,
        };
        let json = serde_json::to_vec(&manifest).map_err(|e| StorageError::Corrupt {
            key: key.storage_key(),
            reason: e.to_string(),
        })?;
        fs::write(dir.join(MANIFEST_FILE), json).await?;
        Ok(())
    }

    async fn read_manifest(&self, dir: &Path, key: &BlobKey) -> Result<BlobManifest, StorageError> {
        let raw = match fs::read(dir.join(MANIFEST_FILE)).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StorageError::NotFound(key.storage_key()));
            }
            Err(e) => return Err(e.into()),
        };

        let manifest: BlobManifest =
            serde_json::from_slice(&raw).map_err(|e| StorageError::Corrupt {
                key: key.storage_key(),
                reason: e.to_string(),
            })?;

        // Two keys sharing a shard directory would mean a SHA-256 collision.
        if manifest.key != key.storage_key() {
            return Err(StorageError::Corrupt {
                key: key.storage_key(),
                reason: format!("manifest belongs to {}", manifest.key),
            });
        }
        Ok(manifest)
    }
}

#[async_trait]
impl BlobStore for FilesystemBlobStore {
    async fn upload(&self, key: &BlobKey, data: &[u8]) -> Result<u64, StorageError> {
        ensure_within_limit(data.len(), self.max_size)?;

        let blob_dir = self.blob_dir(key);
        if fs::try_exists(&blob_dir).await? {
            return Err(StorageError::AlreadyExists(key.storage_key()));
        }

        let temp_dir = self.temp_dir();
        if let Err(e) = self.write_chunks(&temp_dir, key, data).await {
            let _ = fs::remove_dir_all(&temp_dir).await;
            return Err(e);
        }

        if let Some(parent) = blob_dir.parent() {
            fs::create_dir_all(parent).await?;
        }

        if let Err(e) = fs::rename(&temp_dir, &blob_dir).await {
            let _ = fs::remove_dir_all(&temp_dir).await;
            if fs::try_exists(&blob_dir).await.unwrap_or(false) {
                return Err(StorageError::AlreadyExists(key.storage_key()));
            }
            return Err(e.into());
        }

        tracing::debug!(key = %key, size = data.len(), "Blob written to filesystem");
        Ok(data.len() as u64)
    }

    async fn download(&self, key: &BlobKey) -> Result<Vec<u8>, StorageError> {
        let blob_dir = self.blob_dir(key);
        let manifest = self.read_manifest(&blob_dir, key).await?;

        let mut buf = Vec::with_capacity(manifest.length as usize);
        for n in 0..manifest.chunk_count {
            match fs::read(Self::chunk_path(&blob_dir, n)).await {
                Ok(chunk) => buf.extend_from_slice(&chunk),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => break,
                Err(e) => return Err(e.into()),
            }
        }

        ensure_complete(key, manifest.length, buf.len())?;
        Ok(buf)
    }

    async fn delete(&self, key: &BlobKey) -> Result<bool, StorageError> {
        match fs::remove_dir_all(self.blob_dir(key)).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    async fn exists(&self, key: &BlobKey) -> Result<bool, StorageError> {
        Ok(fs::try_exists(self.blob_dir(key).join(MANIFEST_FILE)).await?)
    }
}

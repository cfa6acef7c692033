use std::path::PathBuf;

use serde::Deserialize;

/// Which backend holds blob payloads.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum BlobBackend {
    /// Chunk rows in the catalogue database.
    #[default]
    Database,
    /// Chunk files under `filesystem_root`.
    Filesystem,
    /// Process memory. Contents are lost on restart.
    Memory,
}

/// Blob store configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct BlobStoreConfig {
    /// Storage backend. Default: database.
    #[serde(default)]
    pub backend: BlobBackend,
    /// Root directory for the filesystem backend. Default: "./data/blobs".
    #[serde(default = "default_filesystem_root")]
    pub filesystem_root: PathBuf,
    /// Chunk size in bytes. Default: 255 KiB.
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    /// Largest accepted payload in bytes. Default: 1 GiB.
    #[serde(default = "default_max_size")]
    pub max_size: u64,
}

pub const DEFAULT_CHUNK_SIZE: usize = 255 * 1024;

fn default_filesystem_root() -> PathBuf {
    PathBuf::from("./data/blobs")
}
fn default_chunk_size() -> usize {
    DEFAULT_CHUNK_SIZE
}
fn default_max_size() -> u64 {
    1024 * 1024 * 1024
}

impl Default for BlobStoreConfig {
    fn default() -> Self {
        Self {
            backend: BlobBackend::default(),
            filesystem_root: default_filesystem_root(),
            chunk_size: default_chunk_size(),
            max_size: default_max_size(),
        }
    }
}

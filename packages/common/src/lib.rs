pub mod catalogue;
pub mod config;
pub mod storage;

pub use catalogue::{CatalogueRecord, CatalogueStore, CatalogueStoreError};
pub use storage::{BlobKey, BlobStore, ContentHash, HashEngine, StorageError};

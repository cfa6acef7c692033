mod error;
mod hash;
mod traits;

pub mod filesystem;
pub mod memory;

pub use error::{HashError, StorageError};
pub use hash::{ContentHash, DigestAlgorithm, HashEngine};
pub use traits::{BlobKey, BlobStore, ensure_complete, ensure_within_limit};

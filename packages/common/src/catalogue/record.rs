use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::storage::ContentHash;

/// A catalogue record before the store has assigned it an id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCatalogueRecord {
    pub name: String,
    pub size: u64,
    pub created_at: DateTime<Utc>,
    pub mime_type: String,
    pub content_hash: String,
}

impl NewCatalogueRecord {
    /// Describe a payload of `size` bytes uploaded now.
    pub fn new(
        name: impl Into<String>,
        size: u64,
        mime_type: impl Into<String>,
        hash: &ContentHash,
    ) -> Self {
        Self {
            name: name.into(),
            size,
            created_at: Utc::now(),
            mime_type: mime_type.into(),
            content_hash: hash.to_hex(),
        }
    }

    pub fn with_id(self, id: impl Into<String>) -> CatalogueRecord {
        CatalogueRecord {
            id: id.into(),
            name: self.name,
            size: self.size,
            created_at: self.created_at,
            mime_type: self.mime_type,
            content_hash: self.content_hash,
        }
    }
}

/// Metadata describing one stored video.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogueRecord {
    /// Store-assigned identifier.
    pub id: String,
    /// Original upload filename.
    pub name: String,
    /// Payload length in bytes.
    pub size: u64,
    pub created_at: DateTime<Utc>,
    /// Declared MIME type.
    pub mime_type: String,
    /// Hex digest of the payload. Not unique at the store level.
    pub content_hash: String,
}

/// Single-record lookup criteria.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordFilter {
    /// Exact match on the hex content hash.
    ContentHash(String),
}

impl RecordFilter {
    pub fn content_hash(hash: &ContentHash) -> Self {
        Self::ContentHash(hash.to_hex())
    }

    pub fn matches(&self, record: &CatalogueRecord) -> bool {
        match self {
            Self::ContentHash(hash) => record.content_hash == *hash,
        }
    }
}

use thiserror::Error;

/// Errors reported by a catalogue store backend.
///
/// Absence is not an error: lookups return `Ok(None)` when nothing matches.
#[derive(Debug, Error)]
pub enum CatalogueStoreError {
    /// Connectivity, constraint or query failure in the backing database.
    #[error("catalogue database error: {0}")]
    Database(String),

    /// A stored row could not be turned into a record.
    #[error("failed to decode catalogue record {id}: {reason}")]
    Decode { id: String, reason: String },

    /// The record cannot be represented by the backend.
    #[error("invalid catalogue record: {0}")]
    Invalid(String),
}

#[cfg(feature = "sea-orm")]
impl From<sea_orm::DbErr> for CatalogueStoreError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

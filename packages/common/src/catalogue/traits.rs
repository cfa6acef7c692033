use async_trait::async_trait;

use super::error::CatalogueStoreError;
use super::record::{CatalogueRecord, NewCatalogueRecord, RecordFilter};

/// Record store for video metadata.
///
/// Every operation touches a single record; there are no multi-record
/// transactions. Ids the store could never have issued are simply absent.
#[async_trait]
pub trait CatalogueStore: Send + Sync {
    /// Insert a record and return its newly assigned id.
    async fn insert_record(&self, record: NewCatalogueRecord)
    -> Result<String, CatalogueStoreError>;

    async fn get_by_id(&self, id: &str) -> Result<Option<CatalogueRecord>, CatalogueStoreError>;

    /// Return any one record matching `filter`.
    async fn get_one_by_filter(
        &self,
        filter: &RecordFilter,
    ) -> Result<Option<CatalogueRecord>, CatalogueStoreError>;

    /// Unordered snapshot of every record.
    async fn list_all(&self) -> Result<Vec<CatalogueRecord>, CatalogueStoreError>;

    /// Delete a record, returning the number of records removed.
    async fn delete_by_id(&self, id: &str) -> Result<u64, CatalogueStoreError>;
}

use async_trait::async_trait;
use dashmap::DashMap;
use uuid::Uuid;

use super::error::CatalogueStoreError;
use super::record::{CatalogueRecord, NewCatalogueRecord, RecordFilter};
use super::traits::CatalogueStore;

/// In-process catalogue store keyed by UUIDv7.
#[derive(Default)]
pub struct MemoryCatalogueStore {
    records: DashMap<Uuid, CatalogueRecord>,
}

impl MemoryCatalogueStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[async_trait]
impl CatalogueStore for MemoryCatalogueStore {
    async fn insert_record(
        &self,
        record: NewCatalogueRecord,
    ) -> Result<String, CatalogueStoreError> {
        let id = Uuid::now_v7();
        self.records.insert(id, record.with_id(id.to_string()));
        Ok(id.to_string())
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<CatalogueRecord>, CatalogueStoreError> {
        let Ok(uuid) = Uuid::parse_str(id) else {
            return Ok(None);
        };
        Ok(self.records.get(&uuid).map(|r| r.value().clone()))
    }

    async fn get_one_by_filter(
        &self,
        filter: &RecordFilter,
    ) -> Result<Option<CatalogueRecord>, CatalogueStoreError> {
        Ok(self
            .records
            .iter()
            .find(|r| filter.matches(r.value()))
            .map(|r| r.value().clone()))
    }

    async fn list_all(&self) -> Result<Vec<CatalogueRecord>, CatalogueStoreError> {
        Ok(self.records.iter().map(|r| r.value().clone()).collect())
    }

    async fn delete_by_id(&self, id: &str) -> Result<u64, CatalogueStoreError> {
        let Ok(uuid) = Uuid::parse_str(id) else {
            return Ok(0);
        };
        Ok(u64::from(self.records.remove(&uuid).is_some()))
    }
}

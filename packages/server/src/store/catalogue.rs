use async_trait::async_trait;
use common::catalogue::{
    CatalogueRecord, CatalogueStore, CatalogueStoreError, NewCatalogueRecord, RecordFilter,
};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use uuid::Uuid;

use crate::entity::video_catalogue;

/// Catalogue store backed by the `video_catalogue` table.
#[derive(Clone)]
pub struct SeaOrmCatalogueStore {
    db: DatabaseConnection,
}

impl SeaOrmCatalogueStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn to_record(model: video_catalogue::Model) -> Result<CatalogueRecord, CatalogueStoreError> {
    let size = u64::try_from(model.size).map_err(|_| CatalogueStoreError::Decode {
        id: model.id.to_string(),
        reason: format!("negative size {}", model.size),
    })?;

    Ok(CatalogueRecord {
        id: model.id.to_string(),
        name: model.name,
        size,
        created_at: model.created_at,
        mime_type: model.mime_type,
        content_hash: model.content_hash,
    })
}

#[async_trait]
impl CatalogueStore for SeaOrmCatalogueStore {
    async fn insert_record(
        &self,
        record: NewCatalogueRecord,
    ) -> Result<String, CatalogueStoreError> {
        let size = i64::try_from(record.size)
            .map_err(|_| CatalogueStoreError::Invalid(format!("size {} overflows", record.size)))?;

        let id = Uuid::now_v7();
        let model = video_catalogue::ActiveModel {
            id: Set(id),
            name: Set(record.name),
            size: Set(size),
            created_at: Set(record.created_at),
            mime_type: Set(record.mime_type),
            content_hash: Set(record.content_hash),
        };

        video_catalogue::Entity::insert(model)
            .exec_without_returning(&self.db)
            .await?;

        Ok(id.to_string())
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<CatalogueRecord>, CatalogueStoreError> {
        let Ok(uuid) = Uuid::parse_str(id) else {
            tracing::debug!(file_id = %id, "Malformed catalogue id");
            return Ok(None);
        };

        video_catalogue::Entity::find_by_id(uuid)
            .one(&self.db)
            .await?
            .map(to_record)
            .transpose()
    }

    async fn get_one_by_filter(
        &self,
        filter: &RecordFilter,
    ) -> Result<Option<CatalogueRecord>, CatalogueStoreError> {
        let query = match filter {
            RecordFilter::ContentHash(hash) => video_catalogue::Entity::find()
                .filter(video_catalogue::Column::ContentHash.eq(hash.as_str())),
        };

        query.one(&self.db).await?.map(to_record).transpose()
    }

    async fn list_all(&self) -> Result<Vec<CatalogueRecord>, CatalogueStoreError> {
        video_catalogue::Entity::find()
            .all(&self.db)
            .await?
            .into_iter()
            .map(to_record)
            .collect()
    }

    async fn delete_by_id(&self, id: &str) -> Result<u64, CatalogueStoreError> {
        let Ok(uuid) = Uuid::parse_str(id) else {
            return Ok(0);
        };

        let result = video_catalogue::Entity::delete_by_id(uuid)
            .exec(&self.db)
            .await?;
        Ok(result.rows_affected)
    }
}

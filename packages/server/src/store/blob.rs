use async_trait::async_trait;
use chrono::Utc;
use common::config::BlobStoreConfig;
use common::storage::{
    BlobKey, BlobStore, StorageError, ensure_complete, ensure_within_limit,
};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};

use crate::entity::{video_blob, video_blob_chunk};

/// Chunked blob store in the catalogue database.
///
/// The header row and every chunk are written in one transaction, so a failed
/// upload leaves nothing behind.
#[derive(Clone)]
pub struct SeaOrmBlobStore {
    db: DatabaseConnection,
    chunk_size: usize,
    max_size: u64,
}

impl SeaOrmBlobStore {
    pub fn new(db: DatabaseConnection, chunk_size: usize, max_size: u64) -> Self {
        Self {
            db,
            chunk_size: chunk_size.max(1),
            max_size,
        }
    }

    pub fn from_config(db: DatabaseConnection, config: &BlobStoreConfig) -> Self {
        Self::new(db, config.chunk_size, config.max_size)
    }
}

fn corrupt(key: &BlobKey, reason: impl Into<String>) -> StorageError {
    StorageError::Corrupt {
        key: key.storage_key(),
        reason: reason.into(),
    }
}

#[async_trait]
impl BlobStore for SeaOrmBlobStore {
    async fn upload(&self, key: &BlobKey, data: &[u8]) -> Result<u64, StorageError> {
        ensure_within_limit(data.len(), self.max_size)?;

        let storage_key = key.storage_key();
        let length = i64::try_from(data.len()).map_err(|_| StorageError::SizeLimitExceeded {
            actual: data.len() as u64,
            limit: i64::MAX as u64,
        })?;
        let chunk_size =
            i32::try_from(self.chunk_size).map_err(|_| corrupt(key, "chunk size overflows"))?;
        let chunk_count = data.len().div_ceil(self.chunk_size);
        let chunk_count =
            i32::try_from(chunk_count).map_err(|_| corrupt(key, "chunk count overflows"))?;

        let txn = self.db.begin().await?;

        if video_blob::Entity::find_by_id(storage_key.clone())
            .one(&txn)
            .await?
            .is_some()
        {
            return Err(StorageError::AlreadyExists(storage_key));
        }

        video_blob::Entity::insert(video_blob::ActiveModel {
            storage_key: Set(storage_key.clone()),
            file_id: Set(key.id().to_string()),
            filename: Set(key.name().to_string()),
            length: Set(length),
            chunk_size: Set(chunk_size),
            chunk_count: Set(chunk_count),
            uploaded_at: Set(Utc::now()),
        })
        .exec_without_returning(&txn)
        .await?;

        for (n, chunk) in (0..).zip(data.chunks(self.chunk_size)) {
            video_blob_chunk::Entity::insert(video_blob_chunk::ActiveModel {
                storage_key: Set(storage_key.clone()),
                n: Set(n),
                data: Set(chunk.to_vec()),
            })
            .exec_without_returning(&txn)
            .await?;
        }

        txn.commit().await?;

        tracing::debug!(key = %key, size = data.len(), chunks = chunk_count, "Blob written to database");
        Ok(data.len() as u64)
    }

    async fn download(&self, key: &BlobKey) -> Result<Vec<u8>, StorageError> {
        let storage_key = key.storage_key();

        let header = video_blob::Entity::find_by_id(storage_key.clone())
            .one(&self.db)
            .await?
            .ok_or_else(|| StorageError::NotFound(storage_key.clone()))?;

        let expected =
            u64::try_from(header.length).map_err(|_| corrupt(key, "negative blob length"))?;

        let chunks = video_blob_chunk::Entity::find()
            .filter(video_blob_chunk::Column::StorageKey.eq(storage_key.as_str()))
            .order_by_asc(video_blob_chunk::Column::N)
            .all(&self.db)
            .await?;

        let mut buf = Vec::with_capacity(expected as usize);
        for (n, chunk) in (0..).zip(chunks) {
            if chunk.n != n {
                break;
            }
            buf.extend_from_slice(&chunk.data);
        }

        ensure_complete(key, expected, buf.len())?;
        Ok(buf)
    }

    async fn delete(&self, key: &BlobKey) -> Result<bool, StorageError> {
        let storage_key = key.storage_key();
        let txn = self.db.begin().await?;

        video_blob_chunk::Entity::delete_many()
            .filter(video_blob_chunk::Column::StorageKey.eq(storage_key.as_str()))
            .exec(&txn)
            .await?;
        let result = video_blob::Entity::delete_by_id(storage_key)
            .exec(&txn)
            .await?;

        txn.commit().await?;
        Ok(result.rows_affected > 0)
    }

    async fn exists(&self, key: &BlobKey) -> Result<bool, StorageError> {
        Ok(video_blob::Entity::find_by_id(key.storage_key())
            .one(&self.db)
            .await?
            .is_some())
    }
}

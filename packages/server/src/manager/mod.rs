//! Cross-store orchestration for the video catalogue.
//!
//! A video is a catalogue record plus a blob keyed by the record's id and
//! filename. Writes insert the record first and upload the blob second;
//! deletes remove the record first and the blob second. Neither pair is
//! atomic, so a failure between the two steps leaves one side behind:
//!
//! - upload fails after insert: an orphan record. Reads report it as
//!   [`CatalogueError::NotFound`]; [`UploadFailurePolicy::Compensate`] deletes
//!   it immediately, otherwise [`CatalogueManager::find_orphans`] lists it.
//! - blob delete fails after the record delete: an orphan blob. It is logged
//!   with its key and the failure is reported to the caller.
//!
//! A payload over the configured size limit is rejected before the insert,
//! so it never produces an orphan.
//!
//! Duplicate detection is check-then-insert with no lock in between, so two
//! concurrent uploads of identical bytes can both be accepted.

mod error;


use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use common::catalogue::{CatalogueRecord, CatalogueStore, NewCatalogueRecord, RecordFilter};
use common::storage::{
    BlobKey, BlobStore, ContentHash, HashEngine, StorageError, ensure_within_limit,
};
use tracing::{debug, error, info, warn};

pub use error::{CatalogueError, StoreFailure};

use crate::config::{StorageConfig, UploadFailurePolicy};

/// Store handles the manager works against, built once at startup.
#[derive(Clone)]
pub struct StoreContext {
    pub catalogue: Arc<dyn CatalogueStore>,
    pub blobs: Arc<dyn BlobStore>,
    pub hasher: HashEngine,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ManagerOptions {
    /// Upper bound for every store call and digest computation.
    pub store_timeout: Option<Duration>,
    pub on_upload_failure: UploadFailurePolicy,
    /// Largest payload accepted before anything is written. Unbounded when unset.
    pub max_payload_size: Option<u64>,
}

impl From<&StorageConfig> for ManagerOptions {
    fn from(config: &StorageConfig) -> Self {
        Self {
            store_timeout: config.store_timeout(),
            on_upload_failure: config.on_upload_failure,
            max_payload_size: Some(config.blob.max_size),
        }
    }
}

/// Result of the duplicate check.
#[derive(Debug, Clone)]
pub struct DedupCheck {
    /// Id of an existing record with the same digest, if any.
    pub existing_id: Option<String>,
    pub hash: ContentHash,
}

/// A complete video as returned by [`CatalogueManager::get_file_by_id`].
#[derive(Debug, Clone)]
pub struct VideoFile {
    pub name: String,
    pub data: Vec<u8>,
    pub mime_type: String,
}

/// Lightweight listing entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoSummary {
    pub id: String,
    pub name: String,
    pub size: u64,
    pub created_at: DateTime<Utc>,
}

impl From<CatalogueRecord> for VideoSummary {
    fn from(record: CatalogueRecord) -> Self {
        Self {
            id: record.id,
            name: record.name,
            size: record.size,
            created_at: record.created_at,
        }
    }
}

/// Stateless coordinator between the catalogue store and the blob store.
pub struct CatalogueManager {
    catalogue: Arc<dyn CatalogueStore>,
    blobs: Arc<dyn BlobStore>,
    hasher: HashEngine,
    options: ManagerOptions,
}

impl CatalogueManager {
    pub fn new(context: StoreContext, options: ManagerOptions) -> Self {
        Self {
            catalogue: context.catalogue,
            blobs: context.blobs,
            hasher: context.hasher,
            options,
        }
    }

    /// Run one store call under the configured timeout.
    async fn bounded<T, E>(
        &self,
        operation: &'static str,
        call: impl Future<Output = Result<T, E>>,
    ) -> Result<T, StoreFailure>
    where
        StoreFailure: From<E>,
    {
        match self.options.store_timeout {
            Some(limit) => match tokio::time::timeout(limit, call).await {
                Ok(result) => result.map_err(StoreFailure::from),
                Err(_) => Err(StoreFailure::Timeout { operation, limit }),
            },
            None => call.await.map_err(StoreFailure::from),
        }
    }

    /// Reject an oversized payload before any store is touched.
    fn check_payload_size(&self, len: usize) -> Result<(), CatalogueError> {
        match self.options.max_payload_size {
            Some(limit) => ensure_within_limit(len, limit).map_err(|e| {
                info!(size = len, limit, "Payload over size limit rejected");
                CatalogueError::from(e)
            }),
            None => Ok(()),
        }
    }

    async fn lookup(&self, id: &str) -> Result<CatalogueRecord, CatalogueError> {
        self.bounded("catalogue get_by_id", self.catalogue.get_by_id(id))
            .await
            .inspect_err(|e| error!(file_id = %id, error = %e, "Catalogue lookup failed"))?
            .ok_or_else(|| {
                debug!(file_id = %id, "Catalogue record not found");
                CatalogueError::NotFound(id.to_string())
            })
    }

    /// Digest `data` and look for an existing record with the same digest.
    pub async fn find_by_hash(&self, data: Bytes) -> Result<DedupCheck, CatalogueError> {
        let hash = self
            .bounded("digest", self.hasher.digest(data))
            .await
            .inspect_err(|e| error!(error = %e, "Digest computation failed"))?;

        let existing = self
            .bounded(
                "catalogue get_one_by_filter",
                self.catalogue
                    .get_one_by_filter(&RecordFilter::content_hash(&hash)),
            )
            .await
            .inspect_err(|e| error!(content_hash = %hash, error = %e, "Lookup by hash failed"))?;

        Ok(DedupCheck {
            existing_id: existing.map(|record| record.id),
            hash,
        })
    }

    /// Insert the catalogue record, then upload the payload under its id.
    ///
    /// Does not check for duplicates; see [`CatalogueManager::upload`].
    pub async fn save_video_file(
        &self,
        data: &[u8],
        name: &str,
        mime_type: &str,
        hash: &ContentHash,
    ) -> Result<String, CatalogueError> {
        self.check_payload_size(data.len())?;
        let record = NewCatalogueRecord::new(name, data.len() as u64, mime_type, hash);

        let id = self
            .bounded("catalogue insert_record", self.catalogue.insert_record(record))
            .await
            .inspect_err(|e| error!(filename = %name, error = %e, "Catalogue insert failed"))?;

        let key = BlobKey::new(&id, name);
        match self.bounded("blob upload", self.blobs.upload(&key, data)).await {
            Ok(written) => {
                info!(file_id = %id, size = written, content_hash = %hash, "Video stored");
                Ok(id)
            }
            Err(failure) => {
                self.handle_upload_failure(&id, &failure).await;
                Err(failure.into())
            }
        }
    }

    async fn handle_upload_failure(&self, id: &str, failure: &StoreFailure) {
        if let StoreFailure::Timeout { .. } = failure {
            warn!(file_id = %id, error = %failure, "Blob upload outcome unknown; catalogue record left in place");
            return;
        }

        match self.options.on_upload_failure {
            UploadFailurePolicy::Report => {
                warn!(file_id = %id, error = %failure, "Blob upload failed; catalogue record is orphaned");
            }
            UploadFailurePolicy::Compensate => {
                match self
                    .bounded("catalogue delete_by_id", self.catalogue.delete_by_id(id))
                    .await
                {
                    Ok(_) => {
                        info!(file_id = %id, error = %failure, "Blob upload failed; catalogue record removed");
                    }
                    Err(e) => {
                        error!(file_id = %id, error = %e, "Blob upload failed and record cleanup failed; catalogue record is orphaned");
                    }
                }
            }
        }
    }

    /// Dedup check followed by [`CatalogueManager::save_video_file`].
    pub async fn upload(
        &self,
        data: Bytes,
        name: &str,
        mime_type: &str,
    ) -> Result<String, CatalogueError> {
        self.check_payload_size(data.len())?;
        let check = self.find_by_hash(data.clone()).await?;

        if let Some(existing_id) = check.existing_id {
            info!(file_id = %existing_id, content_hash = %check.hash, "Duplicate upload rejected");
            return Err(CatalogueError::DuplicateContent { existing_id });
        }

        self.save_video_file(&data, name, mime_type, &check.hash)
            .await
    }

    /// Fetch a video's metadata and full payload.
    ///
    /// A record whose blob is missing, incomplete or empty is reported as
    /// [`CatalogueError::NotFound`]. Transport faults stay store failures.
    pub async fn get_file_by_id(&self, id: &str) -> Result<VideoFile, CatalogueError> {
        let record = self.lookup(id).await?;
        let key = BlobKey::new(&record.id, &record.name);

        match self.bounded("blob download", self.blobs.download(&key)).await {
            Ok(data) if !data.is_empty() => Ok(VideoFile {
                name: record.name,
                data,
                mime_type: record.mime_type,
            }),
            Ok(_) => {
                warn!(file_id = %id, key = %key, "Blob is empty; treating video as missing");
                Err(CatalogueError::NotFound(id.to_string()))
            }
            Err(StoreFailure::Blob(
                e @ (StorageError::NotFound(_)
                | StorageError::Incomplete { .. }
                | StorageError::Corrupt { .. }),
            )) => {
                warn!(file_id = %id, key = %key, error = %e, "Catalogue record has no readable blob");
                Err(CatalogueError::NotFound(id.to_string()))
            }
            Err(failure) => {
                error!(file_id = %id, key = %key, error = %failure, "Blob download failed");
                Err(failure.into())
            }
        }
    }

    pub async fn get_metadata_by_id(&self, id: &str) -> Result<CatalogueRecord, CatalogueError> {
        self.lookup(id).await
    }

    /// Unordered projections of every catalogue record. Does not touch blobs.
    pub async fn list_video_files(&self) -> Result<Vec<VideoSummary>, CatalogueError> {
        let records = self
            .bounded("catalogue list_all", self.catalogue.list_all())
            .await
            .inspect_err(|e| error!(error = %e, "Listing catalogue failed"))?;

        Ok(records.into_iter().map(VideoSummary::from).collect())
    }

    /// Delete the catalogue record, then its blob.
    pub async fn delete_video_file(&self, id: &str) -> Result<bool, CatalogueError> {
        let record = self.lookup(id).await?;

        let deleted = self
            .bounded("catalogue delete_by_id", self.catalogue.delete_by_id(id))
            .await
            .inspect_err(|e| error!(file_id = %id, error = %e, "Catalogue delete failed"))?;

        if deleted == 0 {
            debug!(file_id = %id, "Catalogue record deleted concurrently");
            return Err(CatalogueError::NotFound(id.to_string()));
        }

        let key = BlobKey::new(&record.id, &record.name);
        match self.bounded("blob delete", self.blobs.delete(&key)).await {
            Ok(true) => {
                info!(file_id = %id, "Video deleted");
                Ok(true)
            }
            Ok(false) => {
                warn!(file_id = %id, key = %key, "Deleted catalogue record had no blob");
                Ok(true)
            }
            Err(failure) => {
                warn!(file_id = %id, key = %key, error = %failure, "Catalogue record deleted but blob delete failed; blob is orphaned");
                Err(failure.into())
            }
        }
    }

    /// Catalogue records whose blob does not exist.
    ///
    /// Read-only. Records whose upload is still in flight show up too.
    pub async fn find_orphans(&self) -> Result<Vec<CatalogueRecord>, CatalogueError> {
        let records = self
            .bounded("catalogue list_all", self.catalogue.list_all())
            .await?;

        let mut orphans = Vec::new();
        for record in records {
            let key = BlobKey::new(&record.id, &record.name);
            if !self.bounded("blob exists", self.blobs.exists(&key)).await? {
                orphans.push(record);
            }
        }

        if !orphans.is_empty() {
            warn!(count = orphans.len(), "Orphaned catalogue records found");
        }
        Ok(orphans)
    }
}

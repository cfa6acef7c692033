use chrono::{DateTime, Utc};
use common::catalogue::CatalogueRecord;
use serde::Serialize;

use crate::manager::VideoSummary;

/// Listing entry for one video.
#[derive(Serialize, utoipa::ToSchema)]
pub struct VideoSummaryResponse {
    /// Video ID (UUIDv7).
    #[serde(rename = "fileid")]
    #[schema(example = "01936f0e-1234-7abc-8000-000000000001")]
    pub file_id: String,
    /// Original upload filename.
    #[schema(example = "intro.mp4")]
    pub name: String,
    /// Payload size in bytes.
    #[schema(example = 1048576)]
    pub size: u64,
    pub created_at: DateTime<Utc>,
}

impl From<VideoSummary> for VideoSummaryResponse {
    fn from(summary: VideoSummary) -> Self {
        Self {
            file_id: summary.id,
            name: summary.name,
            size: summary.size,
            created_at: summary.created_at,
        }
    }
}

/// Full catalogue record for one video.
#[derive(Serialize, utoipa::ToSchema)]
pub struct VideoRecordResponse {
    /// Video ID (UUIDv7).
    #[serde(rename = "fileid")]
    #[schema(example = "01936f0e-1234-7abc-8000-000000000001")]
    pub file_id: String,
    #[schema(example = "intro.mp4")]
    pub name: String,
    #[schema(example = 1048576)]
    pub size: u64,
    pub created_at: DateTime<Utc>,
    /// Declared MIME type.
    #[schema(example = "video/mp4")]
    #[serde(rename = "type")]
    pub mime_type: String,
    /// Hex digest of the payload.
    #[schema(example = "a1b2c3d4e5f6...")]
    pub hash: String,
}

impl From<CatalogueRecord> for VideoRecordResponse {
    fn from(record: CatalogueRecord) -> Self {
        Self {
            file_id: record.id,
            name: record.name,
            size: record.size,
            created_at: record.created_at,
            mime_type: record.mime_type,
            hash: record.content_hash,
        }
    }
}

/// Response DTO for the locate endpoint.
#[derive(Serialize, utoipa::ToSchema)]
pub struct LocateResponse {
    #[serde(rename = "fileData")]
    pub file_data: VideoRecordResponse,
}

/// Response DTO for a created video.
#[derive(Serialize, utoipa::ToSchema)]
pub struct UploadResponse {
    #[schema(example = "01936f0e-1234-7abc-8000-000000000001")]
    pub id: String,
    /// URL of the video's metadata.
    pub location: String,
}

/// Response DTO for the orphan audit.
#[derive(Serialize, utoipa::ToSchema)]
pub struct OrphanListResponse {
    pub orphans: Vec<VideoRecordResponse>,
    pub total: u64,
}

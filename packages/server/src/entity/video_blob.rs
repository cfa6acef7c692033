use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Header row of a chunked blob. Chunks live in `video_blob_chunk`.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "video_blob")]
pub struct Model {
    /// `{file_id}_{filename}`.
    #[sea_orm(primary_key, auto_increment = false)]
    pub storage_key: String,

    #[sea_orm(indexed)]
    pub file_id: String,

    pub filename: String,

    /// Total payload length in bytes.
    pub length: i64,

    pub chunk_size: i32,

    pub chunk_count: i32,

    pub uploaded_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// One catalogue record per stored video.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "video_catalogue")]
pub struct Model {
    /// UUIDv7 primary key.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Original upload filename.
    pub name: String,

    /// Payload size in bytes.
    pub size: i64,

    pub created_at: DateTimeUtc,

    /// Declared MIME type.
    pub mime_type: String,

    /// Hex digest of the payload. Deliberately not unique.
    #[sea_orm(indexed)]
    pub content_hash: String,
}

impl ActiveModelBehavior for ActiveModel {}

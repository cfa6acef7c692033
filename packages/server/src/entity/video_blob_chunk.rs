use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "video_blob_chunk")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub storage_key: String,

    /// Zero-based chunk index.
    #[sea_orm(primary_key, auto_increment = false)]
    pub n: i32,

    #[sea_orm(column_type = "Blob")]
    pub data: Vec<u8>,
}

impl ActiveModelBehavior for ActiveModel {}

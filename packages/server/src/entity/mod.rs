pub mod video_blob;
pub mod video_blob_chunk;
pub mod video_catalogue;

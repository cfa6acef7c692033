use axum::Json;
use axum::body::Body;
use axum::extract::{Multipart, Path, State};
use axum::extract::multipart::MultipartError;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use bytes::Bytes;
use tracing::instrument;

use crate::error::{AppError, ErrorBody};
use crate::models::video::{
    LocateResponse, UploadResponse, VideoRecordResponse, VideoSummaryResponse,
};
use crate::state::AppState;
use crate::utils::filename::{content_disposition_value, validate_flat_filename};

/// Multipart field carrying the video payload.
const UPLOAD_FIELD: &str = "data";

struct UploadedFile {
    filename: String,
    content_type: String,
    data: Bytes,
}

fn multipart_error(err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(err.body_text())
    } else {
        AppError::Validation(format!("Parsing form-data failed: {}", err.body_text()))
    }
}

async fn read_upload(mut multipart: Multipart) -> Result<UploadedFile, AppError> {
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(UPLOAD_FIELD) {
            continue; // Ignore unknown fields.
        }

        let filename = field
            .file_name()
            .map(str::to_string)
            .ok_or_else(|| AppError::Validation("File field must have a filename".into()))?;
        let content_type = field.content_type().unwrap_or_default().to_string();
        let data = field.bytes().await.map_err(multipart_error)?;

        return Ok(UploadedFile {
            filename,
            content_type,
            data,
        });
    }

    Err(AppError::Validation(format!("Missing '{UPLOAD_FIELD}' field")))
}

#[utoipa::path(
    post,
    path = "/files",
    tag = "Videos",
    operation_id = "uploadVideo",
    summary = "Upload a video",
    description = "Stores a video sent as the `data` multipart field. The part's Content-Type \
        must be one of the configured video MIME types. Byte-identical content that is \
        already catalogued is rejected with CONFLICT and the existing id.",
    request_body(content_type = "multipart/form-data", description = "Video file in the `data` field"),
    responses(
        (status = 201, description = "Video stored", body = UploadResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 409, description = "Identical content exists (CONFLICT)", body = ErrorBody),
        (status = 413, description = "Payload too large (PAYLOAD_TOO_LARGE)", body = ErrorBody),
        (status = 415, description = "Media type not supported (UNSUPPORTED_MEDIA_TYPE)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, multipart))]
pub async fn upload_video(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let upload = read_upload(multipart).await?;

    if !state
        .config
        .storage
        .allowed_mime_types
        .iter()
        .any(|allowed| allowed == &upload.content_type)
    {
        return Err(AppError::UnsupportedMediaType(format!(
            "Media type '{}' not supported",
            upload.content_type
        )));
    }

    let filename = validate_flat_filename(&upload.filename)
        .map_err(|e| AppError::Validation(e.message().into()))?
        .to_string();

    if upload.data.is_empty() {
        return Err(AppError::Validation("File is empty".into()));
    }

    let id = state
        .manager
        .upload(upload.data, &filename, &upload.content_type)
        .await?;

    let location = format!(
        "{}/v1/files/locate/{}",
        state.config.server.public_url.trim_end_matches('/'),
        id
    );

    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location.clone())],
        Json(UploadResponse { id, location }),
    ))
}

#[utoipa::path(
    get,
    path = "/files",
    tag = "Videos",
    operation_id = "listVideos",
    summary = "List videos",
    description = "Returns every catalogued video in no particular order. Not paginated.",
    responses(
        (status = 200, description = "Video list", body = Vec<VideoSummaryResponse>),
    ),
)]
#[instrument(skip(state))]
pub async fn list_videos(
    State(state): State<AppState>,
) -> Result<Json<Vec<VideoSummaryResponse>>, AppError> {
    let videos = state
        .manager
        .list_video_files()
        .await?
        .into_iter()
        .map(VideoSummaryResponse::from)
        .collect();

    Ok(Json(videos))
}

#[utoipa::path(
    get,
    path = "/files/{file_id}",
    tag = "Videos",
    operation_id = "downloadVideo",
    summary = "Download a video",
    description = "Returns the stored payload with its original MIME type and filename.",
    params(("file_id" = String, Path, description = "Video ID")),
    responses(
        (status = 200, description = "Video content"),
        (status = 404, description = "Video not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn download_video(
    State(state): State<AppState>,
    Path(file_id): Path<String>,
) -> Result<Response, AppError> {
    let file = state.manager.get_file_by_id(&file_id).await?;

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, file.mime_type)
        .header(header::CONTENT_LENGTH, file.data.len().to_string())
        .header(
            header::CONTENT_DISPOSITION,
            content_disposition_value(&file.name),
        )
        .body(Body::from(file.data))
        .map_err(|e| AppError::Internal(format!("Failed to build response: {e}")))
}

#[utoipa::path(
    get,
    path = "/files/locate/{file_id}",
    tag = "Videos",
    operation_id = "locateVideo",
    summary = "Get video metadata",
    params(("file_id" = String, Path, description = "Video ID")),
    responses(
        (status = 200, description = "Video metadata", body = LocateResponse),
        (status = 404, description = "Video not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn locate_video(
    State(state): State<AppState>,
    Path(file_id): Path<String>,
) -> Result<Json<LocateResponse>, AppError> {
    let record = state.manager.get_metadata_by_id(&file_id).await?;

    Ok(Json(LocateResponse {
        file_data: VideoRecordResponse::from(record),
    }))
}

#[utoipa::path(
    delete,
    path = "/files/{file_id}",
    tag = "Videos",
    operation_id = "deleteVideo",
    summary = "Delete a video",
    description = "Removes the catalogue record and then the payload.",
    params(("file_id" = String, Path, description = "Video ID")),
    responses(
        (status = 204, description = "Video deleted"),
        (status = 404, description = "Video not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn delete_video(
    State(state): State<AppState>,
    Path(file_id): Path<String>,
) -> Result<StatusCode, AppError> {
    state.manager.delete_video_file(&file_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

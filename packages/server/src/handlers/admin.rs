use axum::{Json, extract::State};
use tracing::instrument;

use crate::error::{AppError, ErrorBody};
use crate::models::video::{OrphanListResponse, VideoRecordResponse};
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/orphans",
    tag = "Admin",
    operation_id = "listOrphans",
    summary = "List catalogue records without a payload",
    description = "Checks every catalogue record for a stored payload and returns the ones \
        that have none. Records whose upload is still in progress are included. \
        Read-only; nothing is repaired.",
    responses(
        (status = 200, description = "Orphaned records", body = OrphanListResponse),
        (status = 500, description = "Store failure (INTERNAL_ERROR)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn list_orphans(
    State(state): State<AppState>,
) -> Result<Json<OrphanListResponse>, AppError> {
    let orphans: Vec<VideoRecordResponse> = state
        .manager
        .find_orphans()
        .await?
        .into_iter()
        .map(VideoRecordResponse::from)
        .collect();

    Ok(Json(OrphanListResponse {
        total: orphans.len() as u64,
        orphans,
    }))
}

use axum::Json;
use serde_json::{Value, json};

#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    operation_id = "health",
    summary = "Liveness probe",
    description = "Always returns an empty JSON object. Does not touch the stores.",
    responses(
        (status = 200, description = "Service is up; body is `{}`"),
    ),
)]
pub async fn health() -> Json<Value> {
    Json(json!({}))
}

use axum::{response::IntoResponse, Json};
use serde_json::json;

#[utoipa::path(
    get,
    path = "/api/v0/health",
    tag = "health",
    responses(
        (status = 200, description = "Service is healthy")
    )
)]
pub async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

use crate::auth::models::AuthContext;
use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use folio_core::models::{MediaAsset, Visibility};
use serde::Deserialize;
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Deserialize, ToSchema)]
pub struct SetVisibilityRequest {
    pub visibility: Visibility,
}

#[utoipa::path(
    post,
    path = "/api/v0/assets/{id}/visibility",
    tag = "assets",
    params(
        ("id" = Uuid, Path, description = "Asset ID")
    ),
    request_body = SetVisibilityRequest,
    responses(
        (status = 200, description = "Updated asset", body = MediaAsset),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Making private requires admin role", body = ErrorResponse),
        (status = 404, description = "Asset not found", body = ErrorResponse),
        (status = 409, description = "Visibility changed concurrently", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn set_asset_visibility(
    State(state): State<Arc<AppState>>,
    ctx: AuthContext,
    Path(id): Path<Uuid>,
    Json(request): Json<SetVisibilityRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let asset = state
        .visibility
        .set_visibility(&ctx, id, request.visibility)
        .await
        .map_err(HttpAppError)?;

    Ok(Json(asset))
}

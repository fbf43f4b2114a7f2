use crate::auth::models::AuthContext;
use crate::constants::MAX_BATCH_DELETE_SIZE;
use crate::error::{ErrorResponse, HttpAppError};
use crate::services::DeletionSummary;
use crate::state::AppState;
use axum::{extract::State, response::IntoResponse, Json};
use folio_core::AppError;
use serde::Deserialize;
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Deserialize, ToSchema)]
pub struct DeleteAssetsRequest {
    pub asset_ids: Vec<Uuid>,
}

#[utoipa::path(
    delete,
    path = "/api/v0/assets",
    tag = "assets",
    request_body = DeleteAssetsRequest,
    responses(
        (status = 200, description = "Deletion summary", body = DeletionSummary),
        (status = 400, description = "Empty or oversized batch", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Deletion requires admin role", body = ErrorResponse),
        (status = 500, description = "Storage deletion failed, catalog untouched", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_assets(
    State(state): State<Arc<AppState>>,
    ctx: AuthContext,
    Json(request): Json<DeleteAssetsRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    if request.asset_ids.len() > MAX_BATCH_DELETE_SIZE {
        return Err(HttpAppError(AppError::InvalidInput(format!(
            "Batch size {} exceeds maximum of {}",
            request.asset_ids.len(),
            MAX_BATCH_DELETE_SIZE
        ))));
    }

    let summary = state
        .deletion
        .delete_batch(&ctx, &request.asset_ids)
        .await
        .map_err(HttpAppError)?;

    Ok(Json(summary))
}

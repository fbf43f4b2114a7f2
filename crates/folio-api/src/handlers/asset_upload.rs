use crate::auth::models::AuthContext;
use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;
use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use folio_core::models::{MediaAsset, Visibility};
use folio_core::AppError;
use std::sync::Arc;

/// Read the upload form: a `file` part plus an optional `visibility` part
/// ("public" or "private", default public).
async fn read_upload_form(
    mut multipart: Multipart,
) -> Result<(String, String, Vec<u8>, Visibility), AppError> {
    let mut file: Option<(String, String, Vec<u8>)> = None;
    let mut visibility = Visibility::Public;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::InvalidInput(format!("Invalid multipart request: {}", e)))?
    {
        match field.name() {
            Some("file") => {
                let filename = field
                    .file_name()
                    .map(String::from)
                    .ok_or_else(|| AppError::InvalidInput("Filename is required".to_string()))?;
                let content_type = field
                    .content_type()
                    .map(String::from)
                    .unwrap_or_else(|| "application/octet-stream".to_string());
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::InvalidInput(format!("Failed to read file: {}", e)))?;
                file = Some((filename, content_type, data.to_vec()));
            }
            Some("visibility") => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| AppError::InvalidInput(format!("Invalid visibility: {}", e)))?;
                visibility = match value.as_str() {
                    "public" => Visibility::Public,
                    "private" => Visibility::Private,
                    other => {
                        return Err(AppError::InvalidInput(format!(
                            "Unknown visibility: {}",
                            other
                        )))
                    }
                };
            }
            _ => {}
        }
    }

    let (filename, content_type, data) =
        file.ok_or_else(|| AppError::InvalidInput("Missing file field".to_string()))?;
    Ok((filename, content_type, data, visibility))
}

#[utoipa::path(
    post,
    path = "/api/v0/assets",
    tag = "assets",
    request_body(content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Asset created", body = MediaAsset),
        (status = 400, description = "Invalid upload", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Private upload requires admin role", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn upload_asset(
    State(state): State<Arc<AppState>>,
    ctx: AuthContext,
    multipart: Multipart,
) -> Result<impl IntoResponse, HttpAppError> {
    let (filename, content_type, data, visibility) =
        read_upload_form(multipart).await.map_err(HttpAppError)?;

    if data.len() > state.config.max_upload_size_bytes() {
        return Err(HttpAppError(AppError::InvalidInput(format!(
            "File exceeds maximum size of {} bytes",
            state.config.max_upload_size_bytes()
        ))));
    }

    let asset = state
        .upload
        .upload(&ctx, &filename, &content_type, data, visibility)
        .await
        .map_err(HttpAppError)?;

    Ok((StatusCode::CREATED, Json(asset)))
}

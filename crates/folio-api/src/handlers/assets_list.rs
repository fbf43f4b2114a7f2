use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;
use axum::{
    extract::{Query, State},
    response::IntoResponse,
    Json,
};
use folio_core::models::{AssetPage, PageCursor};
use serde::Deserialize;
use std::sync::Arc;
use utoipa::IntoParams;

#[derive(Debug, Deserialize, IntoParams)]
pub struct ListAssetsQuery {
    /// Opaque `next_cursor` value from the previous page.
    pub cursor: Option<String>,
    /// Page size; clamped to the configured maximum.
    pub limit: Option<i64>,
}

#[utoipa::path(
    get,
    path = "/api/v0/assets",
    tag = "assets",
    params(ListAssetsQuery),
    responses(
        (status = 200, description = "One page of assets, newest first", body = AssetPage),
        (status = 400, description = "Malformed cursor", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_assets(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListAssetsQuery>,
) -> Result<impl IntoResponse, HttpAppError> {
    let cursor = query
        .cursor
        .as_deref()
        .map(str::parse::<PageCursor>)
        .transpose()
        .map_err(HttpAppError)?;

    let page = state
        .listing
        .list(cursor, query.limit)
        .await
        .map_err(HttpAppError)?;

    Ok(Json(page))
}

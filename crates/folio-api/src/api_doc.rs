//! OpenAPI documentation.

use utoipa::OpenApi;

use crate::error;
use crate::handlers;
use crate::services;
use folio_core::models;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Folio API",
        version = "0.1.0",
        description = "Media asset visibility and signed-URL lifecycle API. Assets live in a public or private container; private assets are served through lazily refreshed signed URLs. All endpoints are versioned under /api/v0/."
    ),
    paths(
        handlers::health::health,
        handlers::assets_list::list_assets,
        handlers::asset_get::get_asset,
        handlers::asset_upload::upload_asset,
        handlers::asset_visibility::set_asset_visibility,
        handlers::assets_delete::delete_assets,
    ),
    components(schemas(
        models::MediaAsset,
        models::AssetPage,
        models::Visibility,
        services::DeletionSummary,
        handlers::asset_visibility::SetVisibilityRequest,
        handlers::assets_delete::DeleteAssetsRequest,
        error::ErrorResponse,
    )),
    tags(
        (name = "health", description = "Service health"),
        (name = "assets", description = "Asset lifecycle operations")
    )
)]
pub struct ApiDoc;

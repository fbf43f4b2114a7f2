//! Route configuration and setup

use crate::api_doc::ApiDoc;
use crate::auth::jwt::JwtService;
use crate::auth::middleware::{auth_middleware, AuthState};
use crate::constants::API_PREFIX;
use crate::handlers;
use crate::state::AppState;
use axum::{
    http::{HeaderValue, Method},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use folio_core::Config;
use std::sync::Arc;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

/// Setup all application routes
pub fn setup_routes(config: &Config, state: Arc<AppState>) -> Result<Router, anyhow::Error> {
    let cors = setup_cors(config)?;
    let auth_state = Arc::new(AuthState {
        jwt: JwtService::new(config.jwt_secret()),
    });

    // Public routes (no authentication required)
    let public_routes = Router::new()
        .route(
            &format!("{API_PREFIX}/health"),
            get(handlers::health::health),
        )
        .route("/api/openapi.json", get(openapi_json));

    // Protected routes (require a valid bearer token)
    let protected_routes = Router::new()
        .route(
            &format!("{API_PREFIX}/assets"),
            get(handlers::assets_list::list_assets)
                .post(handlers::asset_upload::upload_asset)
                .delete(handlers::assets_delete::delete_assets),
        )
        .route(
            &format!("{API_PREFIX}/assets/{{id}}"),
            get(handlers::asset_get::get_asset),
        )
        .route(
            &format!("{API_PREFIX}/assets/{{id}}/visibility"),
            post(handlers::asset_visibility::set_asset_visibility),
        )
        .layer(axum::middleware::from_fn_with_state(
            auth_state,
            auth_middleware,
        ));

    let app = public_routes
        .merge(protected_routes)
        .nest(
            "/docs",
            utoipa_rapidoc::RapiDoc::new("/api/openapi.json")
                .path("/docs")
                .into(),
        )
        // Server-level concurrency limit to protect against resource exhaustion under extreme load
        .layer(ConcurrencyLimitLayer::new(
            std::env::var("HTTP_CONCURRENCY_LIMIT")
                .ok()
                .and_then(|s| s.parse::<usize>().ok())
                .unwrap_or(10_000)
                .max(1),
        ))
        // Headroom over the max file size for the rest of the multipart form.
        .layer(RequestBodyLimitLayer::new(
            config.max_upload_size_bytes() + 1024 * 1024,
        ))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    Ok(app)
}

async fn openapi_json() -> impl IntoResponse {
    Json(ApiDoc::openapi())
}

/// Setup CORS configuration
fn setup_cors(config: &Config) -> Result<CorsLayer, anyhow::Error> {
    let cors = if config.cors_origins().contains(&"*".to_string()) {
        tracing::warn!("CORS configured to allow all origins - not recommended for production");
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
            .allow_headers(Any)
    } else {
        let origins: Result<Vec<HeaderValue>, _> =
            config.cors_origins().iter().map(|o| o.parse()).collect();

        CorsLayer::new()
            .allow_origin(origins.unwrap_or_default())
            .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
            .allow_headers(Any)
    };
    Ok(cors)
}

//! Application setup and initialization
//!
//! All startup logic lives here instead of main.rs so the pieces stay
//! individually testable.

pub mod database;
pub mod routes;
pub mod server;
pub mod storage;
pub mod telemetry;

use crate::state::AppState;
use anyhow::{Context, Result};
use folio_core::Config;
use folio_db::AssetRepository;
use std::sync::Arc;

/// Initialize the entire application
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    // Validate configuration first - fail fast on misconfiguration
    config.validate().context("Configuration validation failed")?;

    telemetry::init_telemetry();

    tracing::info!("Configuration loaded and validated successfully");

    // Setup database
    let pool = database::setup_database(&config).await?;

    // Setup storage
    let storage = storage::setup_storage(&config).await?;

    let catalog = Arc::new(AssetRepository::new(pool));
    let state = Arc::new(AppState::new(config.clone(), catalog, storage));

    // Setup routes
    let router = routes::setup_routes(&config, state.clone())?;

    Ok((state, router))
}

//! Storage setup and initialization

use anyhow::Result;
use folio_core::Config;
use folio_storage::{create_storage, ObjectStorage};
use std::sync::Arc;

/// Build the configured storage backend.
pub async fn setup_storage(config: &Config) -> Result<Arc<dyn ObjectStorage>> {
    tracing::info!("Initializing storage abstraction...");
    let storage = create_storage(config).await?;
    tracing::info!(
        backend = ?storage.backend_type(),
        "Storage abstraction initialized successfully"
    );
    Ok(storage)
}

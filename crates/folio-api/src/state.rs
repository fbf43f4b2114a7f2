//! Application state shared across handlers.

use crate::services::{DeletionService, ListingService, UploadService, VisibilityService};
use folio_core::Config;
use folio_db::AssetCatalog;
use folio_storage::ObjectStorage;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub listing: ListingService,
    pub visibility: VisibilityService,
    pub deletion: DeletionService,
    pub upload: UploadService,
}

impl AppState {
    /// The catalog and storage handles live inside the services; nothing
    /// outside them touches either directly.
    pub fn new(
        config: Config,
        catalog: Arc<dyn AssetCatalog>,
        storage: Arc<dyn ObjectStorage>,
    ) -> Self {
        Self {
            listing: ListingService::new(catalog.clone(), storage.clone(), &config),
            visibility: VisibilityService::new(catalog.clone(), storage.clone()),
            deletion: DeletionService::new(catalog.clone(), storage.clone()),
            upload: UploadService::new(catalog, storage),
            config,
        }
    }
}

//! Asset upload
//!
//! Stores the object first, then registers the catalog row. The storage key
//! is assigned here and never changes for the life of the asset.

use crate::auth::models::AuthContext;
use crate::error::storage_to_app_error;
use folio_core::models::{MediaAsset, Visibility};
use folio_core::AppError;
use folio_db::{AssetCatalog, NewAsset};
use folio_storage::keys::generate_storage_key;
use folio_storage::ObjectStorage;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Clone)]
pub struct UploadService {
    catalog: Arc<dyn AssetCatalog>,
    storage: Arc<dyn ObjectStorage>,
}

impl UploadService {
    pub fn new(catalog: Arc<dyn AssetCatalog>, storage: Arc<dyn ObjectStorage>) -> Self {
        Self { catalog, storage }
    }

    /// Upload a new asset. Creating a private asset requires the admin role.
    #[tracing::instrument(skip(self, ctx, data), fields(name = %name, size_bytes = data.len(), visibility = ?visibility, role = %ctx.role))]
    pub async fn upload(
        &self,
        ctx: &AuthContext,
        name: &str,
        content_type: &str,
        data: Vec<u8>,
        visibility: Visibility,
    ) -> Result<MediaAsset, AppError> {
        if visibility == Visibility::Private && !ctx.is_admin() {
            return Err(AppError::Forbidden(
                "Admin role required to upload a private asset".to_string(),
            ));
        }

        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::InvalidInput("Filename is required".to_string()));
        }
        if name.contains('/') || name.contains("..") {
            return Err(AppError::InvalidInput(
                "Filename must not contain path separators".to_string(),
            ));
        }
        if data.is_empty() {
            return Err(AppError::InvalidInput("File is empty".to_string()));
        }

        let id = Uuid::new_v4();
        let storage_key = generate_storage_key(id, name);
        let size_bytes = data.len() as i64;
        let container = visibility.container();

        self.storage
            .put(container, &storage_key, data, content_type)
            .await
            .map_err(storage_to_app_error)?;

        let access_url = match visibility {
            Visibility::Public => Some(self.storage.public_url(container, &storage_key)),
            Visibility::Private => None,
        };

        let asset = self
            .catalog
            .insert(NewAsset {
                id,
                name: name.to_string(),
                storage_key: storage_key.clone(),
                visibility,
                access_url,
                url_issued_at: None,
                size_bytes,
                content_type: content_type.to_string(),
            })
            .await
            .map_err(|e| {
                // The object is already stored; an orphan in storage is
                // preferable to a row without an object.
                tracing::error!(
                    error = %e,
                    storage_key = %storage_key,
                    reconcile_needed = true,
                    "Catalog insert failed after storage upload"
                );
                e
            })?;

        tracing::info!(asset_id = %asset.id, size_bytes, "Asset uploaded");

        Ok(asset)
    }
}

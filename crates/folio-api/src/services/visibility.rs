//! Visibility toggling
//!
//! Flipping visibility is a two-phase operation: the object is physically
//! moved between containers first, then the catalog row is updated with a
//! compare-and-set on the visibility the caller observed. A lost CAS after a
//! successful move leaves storage and catalog disagreeing; that situation is
//! surfaced loudly for operator reconciliation.

use crate::auth::models::AuthContext;
use crate::error::storage_to_app_error;
use folio_core::models::{MediaAsset, Visibility};
use folio_core::AppError;
use folio_db::AssetCatalog;
use folio_storage::ObjectStorage;
use std::sync::Arc;

#[derive(Clone)]
pub struct VisibilityService {
    catalog: Arc<dyn AssetCatalog>,
    storage: Arc<dyn ObjectStorage>,
}

impl VisibilityService {
    pub fn new(catalog: Arc<dyn AssetCatalog>, storage: Arc<dyn ObjectStorage>) -> Self {
        Self { catalog, storage }
    }

    /// Set an asset's visibility, moving the backing object between
    /// containers. Returns the updated asset.
    ///
    /// Making an asset private requires the admin role; publishing is open to
    /// any authenticated editor. Setting the visibility it already has is a
    /// no-op.
    #[tracing::instrument(skip(self, ctx), fields(asset_id = %id, target = ?target, role = %ctx.role))]
    pub async fn set_visibility(
        &self,
        ctx: &AuthContext,
        id: uuid::Uuid,
        target: Visibility,
    ) -> Result<MediaAsset, AppError> {
        if target == Visibility::Private && !ctx.is_admin() {
            return Err(AppError::Forbidden(
                "Admin role required to make an asset private".to_string(),
            ));
        }

        let asset = self
            .catalog
            .get(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Asset not found".to_string()))?;

        if asset.visibility == target {
            return Ok(asset);
        }

        self.storage
            .move_object(asset.visibility.container(), &asset.storage_key, target.container())
            .await
            .map_err(storage_to_app_error)?;

        // Public assets get their permanent URL eagerly; private assets are
        // signed lazily on the next read.
        let access_url = match target {
            Visibility::Public => Some(
                self.storage
                    .public_url(target.container(), &asset.storage_key),
            ),
            Visibility::Private => None,
        };

        let updated = self
            .catalog
            .set_visibility(id, asset.visibility, target, access_url, None)
            .await
            .map_err(|e| {
                tracing::error!(
                    error = %e,
                    asset_id = %id,
                    storage_key = %asset.storage_key,
                    moved_to = %target.container(),
                    reconcile_needed = true,
                    "Catalog update failed after storage move"
                );
                e
            })?;

        match updated {
            Some(asset) => Ok(asset),
            None => {
                // A concurrent toggle won the CAS. The object now sits in the
                // container this call moved it to, which may not match the
                // winning row.
                tracing::error!(
                    asset_id = %id,
                    storage_key = %asset.storage_key,
                    moved_to = %target.container(),
                    reconcile_needed = true,
                    "Visibility changed concurrently after storage move"
                );
                Err(AppError::Conflict(
                    "Asset visibility was changed concurrently".to_string(),
                ))
            }
        }
    }
}

//! Batch asset deletion
//!
//! Storage first, catalog second: catalog rows are removed only after every
//! storage deletion either succeeded or found the object already gone. A
//! genuine storage failure aborts the batch before the catalog is touched,
//! so no row ever points at an object that was silently kept.

use crate::auth::models::AuthContext;
use folio_core::models::Visibility;
use folio_core::{AppError, Container};
use folio_db::AssetCatalog;
use folio_storage::{ObjectStorage, StorageError};
use std::sync::Arc;
use uuid::Uuid;

/// Result of a batch deletion.
#[derive(Debug, Clone, serde::Serialize, utoipa::ToSchema)]
pub struct DeletionSummary {
    /// Ids the caller asked to delete.
    pub requested: usize,
    /// Catalog rows actually removed.
    pub deleted: u64,
    /// Ids with no catalog row; ignored rather than failing the batch.
    pub missing: Vec<Uuid>,
}

#[derive(Clone)]
pub struct DeletionService {
    catalog: Arc<dyn AssetCatalog>,
    storage: Arc<dyn ObjectStorage>,
}

impl DeletionService {
    pub fn new(catalog: Arc<dyn AssetCatalog>, storage: Arc<dyn ObjectStorage>) -> Self {
        Self { catalog, storage }
    }

    /// Delete a batch of assets. Admin only.
    #[tracing::instrument(skip(self, ctx, ids), fields(count = ids.len(), role = %ctx.role))]
    pub async fn delete_batch(
        &self,
        ctx: &AuthContext,
        ids: &[Uuid],
    ) -> Result<DeletionSummary, AppError> {
        if !ctx.is_admin() {
            return Err(AppError::Forbidden(
                "Admin role required to delete assets".to_string(),
            ));
        }
        if ids.is_empty() {
            return Err(AppError::InvalidInput(
                "No asset ids provided".to_string(),
            ));
        }

        let assets = self.catalog.get_many(ids).await?;
        let found_ids: Vec<Uuid> = assets.iter().map(|a| a.id).collect();
        let missing: Vec<Uuid> = ids
            .iter()
            .filter(|id| !found_ids.contains(id))
            .copied()
            .collect();

        if !missing.is_empty() {
            tracing::debug!(missing = missing.len(), "Ignoring unknown asset ids");
        }

        // Objects live in different containers depending on visibility.
        let mut public_keys = Vec::new();
        let mut private_keys = Vec::new();
        for asset in &assets {
            match asset.visibility {
                Visibility::Public => public_keys.push(asset.storage_key.clone()),
                Visibility::Private => private_keys.push(asset.storage_key.clone()),
            }
        }

        self.delete_from_container(Container::Public, &public_keys)
            .await?;
        self.delete_from_container(Container::Private, &private_keys)
            .await?;

        let deleted = self.catalog.delete_many(&found_ids).await?;

        tracing::info!(
            requested = ids.len(),
            deleted,
            missing = missing.len(),
            "Batch deletion finished"
        );

        Ok(DeletionSummary {
            requested: ids.len(),
            deleted,
            missing,
        })
    }

    /// Delete a set of keys from one container.
    ///
    /// An object that is already gone counts as deleted; any other failure
    /// aborts the whole batch.
    async fn delete_from_container(
        &self,
        container: Container,
        keys: &[String],
    ) -> Result<(), AppError> {
        if keys.is_empty() {
            return Ok(());
        }

        let outcomes = self.storage.delete_many(container, keys).await;
        for outcome in outcomes {
            match outcome.result {
                Ok(()) => {}
                Err(StorageError::NotFound(_)) => {
                    tracing::warn!(
                        key = %outcome.key,
                        container = %container,
                        "Object already absent from storage"
                    );
                }
                Err(e) => {
                    return Err(AppError::Storage(format!(
                        "Failed to delete {}: {}",
                        outcome.key, e
                    )));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::testing::{admin_ctx, editor_ctx, InMemoryCatalog, MockStorage, TestAsset};

    fn service(catalog: Arc<InMemoryCatalog>, storage: Arc<MockStorage>) -> DeletionService {
        DeletionService::new(catalog, storage)
    }

    #[tokio::test]
    async fn test_delete_batch_spans_both_containers() {
        let catalog = Arc::new(InMemoryCatalog::new());
        let storage = Arc::new(MockStorage::new());

        let public = catalog.seed(TestAsset::public("banner.png")).await;
        let private = catalog.seed(TestAsset::private("cv.pdf")).await;

        let summary = service(catalog.clone(), storage.clone())
            .delete_batch(&admin_ctx(), &[public.id, private.id])
            .await
            .unwrap();

        assert_eq!(summary.requested, 2);
        assert_eq!(summary.deleted, 2);
        assert!(summary.missing.is_empty());
        assert_eq!(catalog.len(), 0);

        let deletes = storage.deletes();
        assert_eq!(deletes.len(), 2);
        assert_eq!(deletes[0].0, Container::Public);
        assert_eq!(deletes[0].1, vec![public.storage_key.clone()]);
        assert_eq!(deletes[1].0, Container::Private);
        assert_eq!(deletes[1].1, vec![private.storage_key.clone()]);
    }

    #[tokio::test]
    async fn test_delete_batch_requires_admin() {
        let catalog = Arc::new(InMemoryCatalog::new());
        let storage = Arc::new(MockStorage::new());
        let asset = catalog.seed(TestAsset::public("banner.png")).await;

        let result = service(catalog.clone(), storage.clone())
            .delete_batch(&editor_ctx(), &[asset.id])
            .await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
        assert_eq!(catalog.len(), 1);
        assert!(storage.deletes().is_empty());
    }

    #[tokio::test]
    async fn test_delete_batch_rejects_empty_set() {
        let catalog = Arc::new(InMemoryCatalog::new());
        let storage = Arc::new(MockStorage::new());

        let result = service(catalog, storage).delete_batch(&admin_ctx(), &[]).await;
        assert!(matches!(result, Err(AppError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_delete_batch_ignores_unknown_ids() {
        let catalog = Arc::new(InMemoryCatalog::new());
        let storage = Arc::new(MockStorage::new());
        let asset = catalog.seed(TestAsset::public("banner.png")).await;
        let ghost = Uuid::new_v4();

        let summary = service(catalog.clone(), storage)
            .delete_batch(&admin_ctx(), &[asset.id, ghost])
            .await
            .unwrap();

        assert_eq!(summary.deleted, 1);
        assert_eq!(summary.missing, vec![ghost]);
        assert_eq!(catalog.len(), 0);
    }

    #[tokio::test]
    async fn test_delete_batch_treats_absent_object_as_deleted() {
        let catalog = Arc::new(InMemoryCatalog::new());
        let storage = Arc::new(MockStorage::new());
        let asset = catalog.seed(TestAsset::public("banner.png")).await;
        storage.missing_object(&asset.storage_key);

        let summary = service(catalog.clone(), storage)
            .delete_batch(&admin_ctx(), &[asset.id])
            .await
            .unwrap();

        assert_eq!(summary.deleted, 1);
        assert_eq!(catalog.len(), 0);
    }

    #[tokio::test]
    async fn test_storage_failure_aborts_before_catalog() {
        let catalog = Arc::new(InMemoryCatalog::new());
        let storage = Arc::new(MockStorage::new());
        let ok = catalog.seed(TestAsset::public("banner.png")).await;
        let bad = catalog.seed(TestAsset::public("logo.svg")).await;
        storage.fail_delete_of(&bad.storage_key);

        let result = service(catalog.clone(), storage)
            .delete_batch(&admin_ctx(), &[ok.id, bad.id])
            .await;

        assert!(matches!(result, Err(AppError::Storage(_))));
        // Catalog untouched, including the asset whose object did delete.
        assert_eq!(catalog.len(), 2);
    }
}

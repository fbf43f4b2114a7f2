//! Asset listing and read-path URL refresh
//!
//! Signed URLs for private assets are refreshed lazily when a page (or a
//! single asset) is served: stale URLs are re-signed concurrently, written
//! back to the catalog, and the repaired assets are returned. A failed or
//! slow signing never fails the request; the affected asset is dropped from
//! the page and the rest is served. It reappears on the next read once the
//! signer recovers.

use chrono::{Duration, Utc};
use folio_core::models::{AssetPage, MediaAsset, PageCursor};
use folio_core::{AppError, Config, Container};
use folio_db::{AssetCatalog, UrlUpdate};
use folio_storage::ObjectStorage;
use std::sync::Arc;
use std::time::Duration as StdDuration;

#[derive(Clone)]
pub struct ListingService {
    catalog: Arc<dyn AssetCatalog>,
    storage: Arc<dyn ObjectStorage>,
    url_ttl: Duration,
    sign_timeout: StdDuration,
    default_page_size: i64,
    max_page_size: i64,
}

impl ListingService {
    pub fn new(
        catalog: Arc<dyn AssetCatalog>,
        storage: Arc<dyn ObjectStorage>,
        config: &Config,
    ) -> Self {
        Self {
            catalog,
            storage,
            url_ttl: config.signed_url_ttl(),
            sign_timeout: config.sign_timeout(),
            default_page_size: config.default_page_size(),
            max_page_size: config.max_page_size(),
        }
    }

    /// Fetch one page of assets, newest first, with fresh access URLs.
    #[tracing::instrument(skip(self))]
    pub async fn list(
        &self,
        cursor: Option<PageCursor>,
        limit: Option<i64>,
    ) -> Result<AssetPage, AppError> {
        let limit = limit
            .unwrap_or(self.default_page_size)
            .clamp(1, self.max_page_size);

        // Fetch one extra row to learn whether another page exists. The
        // cursor marks the last row of this page; the next query resumes
        // strictly after it.
        let mut assets = self.catalog.list_page(cursor, limit + 1).await?;

        let next_cursor = if assets.len() as i64 > limit {
            assets.truncate(limit as usize);
            assets.last().map(|a| PageCursor::of(a).to_string())
        } else {
            None
        };

        let failed = self.refresh_stale_urls(&mut assets).await;
        if !failed.is_empty() {
            // A stale URL we could not repair is worse than a shorter page;
            // the asset comes back on the next read.
            assets.retain(|a| !failed.contains(&a.id));
        }

        Ok(AssetPage {
            assets,
            next_cursor,
        })
    }

    /// Fetch a single asset with a fresh access URL.
    ///
    /// Unlike a listing, a direct fetch has nothing to omit: when the
    /// refresh fails the asset is served with whatever URL the catalog had.
    #[tracing::instrument(skip(self), fields(asset_id = %id))]
    pub async fn get(&self, id: uuid::Uuid) -> Result<MediaAsset, AppError> {
        let asset = self
            .catalog
            .get(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Asset not found".to_string()))?;

        let mut assets = vec![asset];
        self.refresh_stale_urls(&mut assets).await;

        Ok(assets.remove(0))
    }

    /// Re-sign stale private URLs in place and persist them, returning the
    /// ids of assets whose refresh failed or timed out.
    ///
    /// Signing runs concurrently across the page, each call bounded by the
    /// configured timeout.
    async fn refresh_stale_urls(&self, assets: &mut [MediaAsset]) -> Vec<uuid::Uuid> {
        let now = Utc::now();
        let expires_in = self
            .url_ttl
            .to_std()
            .unwrap_or(StdDuration::from_secs(24 * 3600));

        let stale: Vec<usize> = assets
            .iter()
            .enumerate()
            .filter(|(_, a)| a.needs_url_refresh(now, self.url_ttl))
            .map(|(i, _)| i)
            .collect();

        if stale.is_empty() {
            return Vec::new();
        }

        let signings = stale.iter().map(|&i| {
            let storage = self.storage.clone();
            let key = assets[i].storage_key.clone();
            let timeout = self.sign_timeout;
            async move {
                let result = tokio::time::timeout(
                    timeout,
                    storage.signed_url(Container::Private, &key, expires_in),
                )
                .await;
                (i, result)
            }
        });

        let results = futures::future::join_all(signings).await;

        let mut failed = Vec::new();
        for (i, result) in results {
            let asset = &mut assets[i];
            match result {
                Ok(Ok(url)) => {
                    asset.access_url = Some(url.clone());
                    asset.url_issued_at = Some(now);

                    // The URL in the response is already fresh; a failed
                    // write-back just means the next read re-signs.
                    if let Err(e) = self
                        .catalog
                        .update_access_url(
                            asset.id,
                            UrlUpdate {
                                access_url: url,
                                issued_at: now,
                            },
                        )
                        .await
                    {
                        tracing::warn!(
                            error = %e,
                            asset_id = %asset.id,
                            "Failed to persist refreshed signed URL"
                        );
                    }
                }
                Ok(Err(e)) => {
                    tracing::warn!(
                        error = %e,
                        asset_id = %asset.id,
                        "Signing failed, refresh skipped for this asset"
                    );
                    failed.push(asset.id);
                }
                Err(_) => {
                    tracing::warn!(
                        asset_id = %asset.id,
                        timeout_ms = self.sign_timeout.as_millis() as u64,
                        "Signing timed out, refresh skipped for this asset"
                    );
                    failed.push(asset.id);
                }
            }
        }

        failed
    }
}

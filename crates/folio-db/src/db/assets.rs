use async_trait::async_trait;
use chrono::{DateTime, Utc};
use folio_core::models::{MediaAsset, PageCursor, Visibility};
use folio_core::AppError;
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

const ASSET_COLUMNS: &str = "id, name, storage_key, visibility, access_url, url_issued_at, \
                             uploaded_at, size_bytes, content_type, updated_at";

/// Fields required to register a new asset in the catalog.
#[derive(Debug, Clone)]
pub struct NewAsset {
    pub id: Uuid,
    pub name: String,
    pub storage_key: String,
    pub visibility: Visibility,
    pub access_url: Option<String>,
    pub url_issued_at: Option<DateTime<Utc>>,
    pub size_bytes: i64,
    pub content_type: String,
}

/// A freshly minted access URL and the time it was issued.
#[derive(Debug, Clone)]
pub struct UrlUpdate {
    pub access_url: String,
    pub issued_at: DateTime<Utc>,
}

/// Catalog of media assets.
///
/// The lifecycle services depend on this trait rather than on a concrete
/// repository so they can run against an in-memory double in tests.
#[async_trait]
pub trait AssetCatalog: Send + Sync {
    /// Fetch one asset by id.
    async fn get(&self, id: Uuid) -> Result<Option<MediaAsset>, AppError>;

    /// Fetch a set of assets by id. Ids without a matching row are simply
    /// absent from the result; order is unspecified.
    async fn get_many(&self, ids: &[Uuid]) -> Result<Vec<MediaAsset>, AppError>;

    /// Fetch one page of assets, newest first.
    ///
    /// `cursor` is the position of the last row already served: the page
    /// holds rows strictly after it in `(uploaded_at, id)` descending order.
    /// The id tie-break keeps the walk moving when many rows share one
    /// `uploaded_at`. `None` starts from the newest asset. Returns at most
    /// `limit` rows.
    async fn list_page(
        &self,
        cursor: Option<PageCursor>,
        limit: i64,
    ) -> Result<Vec<MediaAsset>, AppError>;

    /// Register a new asset.
    async fn insert(&self, asset: NewAsset) -> Result<MediaAsset, AppError>;

    /// Persist a refreshed signed URL for an asset.
    async fn update_access_url(&self, id: Uuid, update: UrlUpdate) -> Result<(), AppError>;

    /// Flip an asset's visibility, guarded by the visibility the caller
    /// observed. Returns the updated asset, or `None` when the row no longer
    /// carries `expected` (a concurrent toggle won).
    async fn set_visibility(
        &self,
        id: Uuid,
        expected: Visibility,
        new_visibility: Visibility,
        access_url: Option<String>,
        url_issued_at: Option<DateTime<Utc>>,
    ) -> Result<Option<MediaAsset>, AppError>;

    /// Remove a set of assets, returning the number of rows deleted.
    async fn delete_many(&self, ids: &[Uuid]) -> Result<u64, AppError>;
}

/// Postgres-backed asset catalog.
#[derive(Clone)]
pub struct AssetRepository {
    pool: PgPool,
}

impl AssetRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AssetCatalog for AssetRepository {
    #[tracing::instrument(skip(self), fields(db.table = "assets", db.operation = "select", db.record_id = %id))]
    async fn get(&self, id: Uuid) -> Result<Option<MediaAsset>, AppError> {
        let asset = sqlx::query_as::<Postgres, MediaAsset>(&format!(
            "SELECT {ASSET_COLUMNS} FROM assets WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(asset)
    }

    #[tracing::instrument(skip(self, ids), fields(db.table = "assets", db.operation = "select", count = ids.len()))]
    async fn get_many(&self, ids: &[Uuid]) -> Result<Vec<MediaAsset>, AppError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let assets = sqlx::query_as::<Postgres, MediaAsset>(&format!(
            "SELECT {ASSET_COLUMNS} FROM assets WHERE id = ANY($1)"
        ))
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(assets)
    }

    #[tracing::instrument(skip(self), fields(db.table = "assets", db.operation = "select"))]
    async fn list_page(
        &self,
        cursor: Option<PageCursor>,
        limit: i64,
    ) -> Result<Vec<MediaAsset>, AppError> {
        // Keyset pagination; stable under concurrent inserts, unlike OFFSET.
        // The row comparison matches the (uploaded_at DESC, id DESC) order.
        let assets = match cursor {
            Some(after) => {
                sqlx::query_as::<Postgres, MediaAsset>(&format!(
                    "SELECT {ASSET_COLUMNS} FROM assets WHERE (uploaded_at, id) < ($1, $2) \
                     ORDER BY uploaded_at DESC, id DESC LIMIT $3"
                ))
                .bind(after.uploaded_at)
                .bind(after.id)
                .bind(limit)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<Postgres, MediaAsset>(&format!(
                    "SELECT {ASSET_COLUMNS} FROM assets \
                     ORDER BY uploaded_at DESC, id DESC LIMIT $1"
                ))
                .bind(limit)
                .fetch_all(&self.pool)
                .await?
            }
        };

        Ok(assets)
    }

    #[tracing::instrument(skip(self, asset), fields(db.table = "assets", db.operation = "insert", db.record_id = %asset.id))]
    async fn insert(&self, asset: NewAsset) -> Result<MediaAsset, AppError> {
        let now = Utc::now();

        let inserted = sqlx::query_as::<Postgres, MediaAsset>(&format!(
            r#"
            INSERT INTO assets (
                id, name, storage_key, visibility, access_url, url_issued_at,
                uploaded_at, size_bytes, content_type, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $7)
            RETURNING {ASSET_COLUMNS}
            "#
        ))
        .bind(asset.id)
        .bind(&asset.name)
        .bind(&asset.storage_key)
        .bind(asset.visibility)
        .bind(&asset.access_url)
        .bind(asset.url_issued_at)
        .bind(now)
        .bind(asset.size_bytes)
        .bind(&asset.content_type)
        .fetch_one(&self.pool)
        .await?;

        Ok(inserted)
    }

    #[tracing::instrument(skip(self, update), fields(db.table = "assets", db.operation = "update", db.record_id = %id))]
    async fn update_access_url(&self, id: Uuid, update: UrlUpdate) -> Result<(), AppError> {
        // Deliberately does not touch updated_at: a URL refresh is a read-path
        // repair, not a content change.
        sqlx::query(
            "UPDATE assets SET access_url = $2, url_issued_at = $3 WHERE id = $1",
        )
        .bind(id)
        .bind(&update.access_url)
        .bind(update.issued_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    #[tracing::instrument(skip(self, access_url), fields(db.table = "assets", db.operation = "update", db.record_id = %id))]
    async fn set_visibility(
        &self,
        id: Uuid,
        expected: Visibility,
        new_visibility: Visibility,
        access_url: Option<String>,
        url_issued_at: Option<DateTime<Utc>>,
    ) -> Result<Option<MediaAsset>, AppError> {
        // Compare-and-set on the visibility the caller read. Zero rows means
        // a concurrent toggle changed it first.
        let updated = sqlx::query_as::<Postgres, MediaAsset>(&format!(
            r#"
            UPDATE assets
            SET visibility = $3, access_url = $4, url_issued_at = $5, updated_at = NOW()
            WHERE id = $1 AND visibility = $2
            RETURNING {ASSET_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(expected)
        .bind(new_visibility)
        .bind(&access_url)
        .bind(url_issued_at)
        .fetch_optional(&self.pool)
        .await?;

        Ok(updated)
    }

    #[tracing::instrument(skip(self, ids), fields(db.table = "assets", db.operation = "delete", count = ids.len()))]
    async fn delete_many(&self, ids: &[Uuid]) -> Result<u64, AppError> {
        if ids.is_empty() {
            return Ok(0);
        }

        let result = sqlx::query("DELETE FROM assets WHERE id = ANY($1)")
            .bind(ids)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}

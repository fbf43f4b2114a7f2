use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;
use uuid::Uuid;

#[cfg(feature = "sqlx")]
use sqlx::FromRow;

use crate::error::AppError;
use crate::storage_types::Container;

/// Asset visibility: determines which container holds the object and how its
/// access URL is computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(
    feature = "sqlx",
    sqlx(type_name = "visibility", rename_all = "lowercase")
)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Public,
    Private,
}

impl Visibility {
    /// The container that holds the object for this visibility.
    pub fn container(self) -> Container {
        match self {
            Visibility::Public => Container::Public,
            Visibility::Private => Container::Private,
        }
    }

    /// The opposite visibility (used by the toggle service).
    pub fn inverse(self) -> Self {
        match self {
            Visibility::Public => Visibility::Private,
            Visibility::Private => Visibility::Public,
        }
    }
}

/// Catalog row for one media asset.
///
/// `storage_key` is stable across visibility changes; only the owning
/// container moves. `url_issued_at` is a dedicated freshness field for
/// `access_url` and is never reused for general row bookkeeping.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(FromRow))]
pub struct MediaAsset {
    pub id: Uuid,
    pub name: String,
    pub storage_key: String,
    pub visibility: Visibility,
    pub access_url: Option<String>,
    pub url_issued_at: Option<DateTime<Utc>>,
    pub uploaded_at: DateTime<Utc>,
    pub size_bytes: i64,
    pub content_type: String,
    pub updated_at: DateTime<Utc>,
}

impl MediaAsset {
    /// Whether the cached signed URL must be regenerated before serving.
    ///
    /// Public assets never go stale: their URL is permanent. A private asset
    /// is stale when it has no cached URL, no issuance timestamp, or the
    /// issuance timestamp is at least `ttl` old.
    pub fn needs_url_refresh(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        if self.visibility == Visibility::Public {
            return false;
        }
        if self.access_url.is_none() {
            return true;
        }
        match self.url_issued_at {
            Some(issued_at) => now - issued_at >= ttl,
            None => true,
        }
    }
}

/// Keyset position of the last asset served on a page.
///
/// `uploaded_at` alone cannot order rows inserted in one transaction (they
/// share the same timestamp), so the id breaks ties. Serialized as an opaque
/// `{timestamp_micros}.{asset_id}` string; Postgres stores timestamps at
/// microsecond precision, so the round trip is exact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageCursor {
    pub uploaded_at: DateTime<Utc>,
    pub id: Uuid,
}

impl PageCursor {
    pub fn of(asset: &MediaAsset) -> Self {
        Self {
            uploaded_at: asset.uploaded_at,
            id: asset.id,
        }
    }
}

impl fmt::Display for PageCursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}",
            self.uploaded_at.timestamp_micros(),
            self.id.simple()
        )
    }
}

impl FromStr for PageCursor {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (micros, id) = s
            .split_once('.')
            .ok_or_else(|| AppError::InvalidInput("Malformed cursor".to_string()))?;
        let micros: i64 = micros
            .parse()
            .map_err(|_| AppError::InvalidInput("Malformed cursor".to_string()))?;
        let uploaded_at = DateTime::from_timestamp_micros(micros)
            .ok_or_else(|| AppError::InvalidInput("Malformed cursor".to_string()))?;
        let id = Uuid::parse_str(id)
            .map_err(|_| AppError::InvalidInput("Malformed cursor".to_string()))?;
        Ok(Self { uploaded_at, id })
    }
}

/// One page of assets with the cursor for the next page.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AssetPage {
    pub assets: Vec<MediaAsset>,
    /// Opaque cursor marking where this page ended; pass it back to fetch
    /// the next page. Absent on the last page.
    pub next_cursor: Option<String>,
}

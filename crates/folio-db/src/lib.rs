//! Folio database library
//!
//! Repositories for the asset catalog, plus the `AssetCatalog` trait the
//! lifecycle services depend on. Services take the trait so they can be
//! exercised without a running Postgres instance.

pub mod db;

pub use db::assets::{AssetCatalog, AssetRepository, NewAsset, UrlUpdate};

//! Database repositories for data access layer
//!
//! Each repository owns a `PgPool` clone and is responsible for one domain
//! entity.

pub mod assets;

pub use assets::AssetRepository;

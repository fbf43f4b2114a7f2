//! Folio core library
//!
//! Domain models, configuration, and error types shared by the storage,
//! catalog, and API crates.

pub mod config;
pub mod error;
pub mod models;
pub mod storage_types;

pub use config::Config;
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use storage_types::{Container, StorageBackend};

//! Folio storage library
//!
//! Object-storage abstraction over two logical containers: a *public*
//! container whose objects have stable permanent URLs, and a *private*
//! container reachable only through short-lived signed URLs. Backends: S3
//! (and S3-compatible providers) and local filesystem.
//!
//! # Storage key format
//!
//! Keys are `assets/{asset_id}/{filename}` and are identical in both
//! containers: a visibility change moves the object between containers but
//! never rewrites its key. Keys must not contain `..` or a leading `/`.
//! Key generation is centralized in the `keys` module.

pub mod factory;
pub mod keys;
#[cfg(feature = "storage-local")]
pub mod local;
#[cfg(feature = "storage-s3")]
pub mod s3;
pub mod traits;

// Re-export commonly used types
pub use factory::create_storage;
pub use folio_core::{Container, StorageBackend};
#[cfg(feature = "storage-local")]
pub use local::LocalObjectStorage;
#[cfg(feature = "storage-s3")]
pub use s3::S3ObjectStorage;
pub use traits::{DeleteOutcome, ObjectStorage, StorageError, StorageResult};

//! Storage abstraction trait
//!
//! Defines the ObjectStorage trait that all storage backends must implement.

use async_trait::async_trait;
use folio_core::{Container, StorageBackend};
use std::time::Duration;
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("Move failed: {0}")]
    MoveFailed(String),

    #[error("Signing failed: {0}")]
    SignFailed(String),

    #[error("Object not found: {0}")]
    NotFound(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Storage backend error: {0}")]
    BackendError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Outcome of deleting one key within a bulk delete.
#[derive(Debug)]
pub struct DeleteOutcome {
    pub key: String,
    pub result: StorageResult<()>,
}

/// Storage abstraction trait
///
/// Backends (S3, local filesystem) expose the same two-container surface so
/// the lifecycle services never couple to a provider.
///
/// **Key format:** `assets/{asset_id}/{filename}`; identical across
/// containers. See the crate root documentation.
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Upload an object into the given container.
    async fn put(
        &self,
        container: Container,
        key: &str,
        data: Vec<u8>,
        content_type: &str,
    ) -> StorageResult<()>;

    /// Delete a set of objects from one container, returning a per-key result.
    ///
    /// Callers decide how to treat individual failures; this method never
    /// short-circuits on the first error.
    async fn delete_many(&self, container: Container, keys: &[String]) -> Vec<DeleteOutcome>;

    /// Relocate an object between containers without changing its key.
    ///
    /// On failure the object remains in `source`; the destination is not left
    /// with a partial copy.
    async fn move_object(
        &self,
        source: Container,
        key: &str,
        dest: Container,
    ) -> StorageResult<()>;

    /// Mint a time-limited signed URL granting read access to a private object.
    async fn signed_url(
        &self,
        container: Container,
        key: &str,
        expires_in: Duration,
    ) -> StorageResult<String>;

    /// Derive the permanent URL for an object in the public container.
    ///
    /// Cheap and deterministic; no network call.
    fn public_url(&self, container: Container, key: &str) -> String;

    /// Check whether an object exists in the given container.
    async fn exists(&self, container: Container, key: &str) -> StorageResult<bool>;

    /// Get the storage backend type
    fn backend_type(&self) -> StorageBackend;
}

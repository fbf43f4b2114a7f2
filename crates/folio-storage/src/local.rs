use crate::keys::validate_key;
use crate::traits::{DeleteOutcome, ObjectStorage, StorageError, StorageResult};
use async_trait::async_trait;
use folio_core::{Container, StorageBackend};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

/// Local filesystem storage implementation.
///
/// Each container maps to a subdirectory of the base path (`public/`,
/// `private/`). Signed URLs are a development stand-in: they carry an expiry
/// and a random token so refreshed URLs are distinguishable, but nothing
/// verifies them.
#[derive(Clone)]
pub struct LocalObjectStorage {
    base_path: PathBuf,
    base_url: String,
}

impl LocalObjectStorage {
    /// Create a new LocalObjectStorage instance
    ///
    /// # Arguments
    /// * `base_path` - Root directory for file storage (e.g., "/var/lib/folio/assets")
    /// * `base_url` - Base URL for serving files (e.g., "http://localhost:3000/files")
    pub async fn new(base_path: impl Into<PathBuf>, base_url: String) -> StorageResult<Self> {
        let base_path = base_path.into();

        for container in [Container::Public, Container::Private] {
            let dir = base_path.join(container.to_string());
            fs::create_dir_all(&dir).await.map_err(|e| {
                StorageError::ConfigError(format!(
                    "Failed to create storage directory {}: {}",
                    dir.display(),
                    e
                ))
            })?;
        }

        Ok(LocalObjectStorage {
            base_path,
            base_url,
        })
    }

    /// Convert container + storage key to a filesystem path with security validation.
    ///
    /// Rejects keys with path traversal sequences that could escape the
    /// container directory.
    fn key_to_path(&self, container: Container, key: &str) -> StorageResult<PathBuf> {
        validate_key(key)?;

        let container_root = self.base_path.join(container.to_string());
        let path = container_root.join(key);

        if let Ok(canonical) = path.canonicalize() {
            let root_canonical = container_root.canonicalize().map_err(|e| {
                StorageError::ConfigError(format!("Failed to canonicalize base path: {}", e))
            })?;
            if canonical.strip_prefix(&root_canonical).is_err() {
                return Err(StorageError::InvalidKey(
                    "Storage key resolves outside storage directory".to_string(),
                ));
            }
        }

        Ok(path)
    }

    fn generate_url(&self, container: Container, key: &str) -> String {
        format!(
            "{}/{}/{}",
            self.base_url.trim_end_matches('/'),
            container,
            key
        )
    }

    /// Ensure parent directory exists
    async fn ensure_parent_dir(&self, path: &Path) -> StorageResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        Ok(())
    }

    async fn delete_one(&self, container: Container, key: &str) -> StorageResult<()> {
        let path = self.key_to_path(container, key)?;

        if !fs::try_exists(&path).await.unwrap_or(false) {
            return Err(StorageError::NotFound(key.to_string()));
        }

        fs::remove_file(&path).await.map_err(|e| {
            StorageError::DeleteFailed(format!("Failed to delete file {}: {}", path.display(), e))
        })
    }
}

#[async_trait]
impl ObjectStorage for LocalObjectStorage {
    async fn put(
        &self,
        container: Container,
        key: &str,
        data: Vec<u8>,
        _content_type: &str,
    ) -> StorageResult<()> {
        let path = self.key_to_path(container, key)?;
        let size = data.len();

        self.ensure_parent_dir(&path).await?;

        let start = std::time::Instant::now();

        let mut file = fs::File::create(&path).await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to create file {}: {}", path.display(), e))
        })?;

        file.write_all(&data).await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to write file {}: {}", path.display(), e))
        })?;

        file.sync_all().await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to sync file {}: {}", path.display(), e))
        })?;

        tracing::info!(
            path = %path.display(),
            container = %container,
            key = %key,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage upload successful"
        );

        Ok(())
    }

    async fn delete_many(&self, container: Container, keys: &[String]) -> Vec<DeleteOutcome> {
        let mut outcomes = Vec::with_capacity(keys.len());
        for key in keys {
            let result = self.delete_one(container, key).await;
            outcomes.push(DeleteOutcome {
                key: key.clone(),
                result,
            });
        }
        outcomes
    }

    async fn move_object(
        &self,
        source: Container,
        key: &str,
        dest: Container,
    ) -> StorageResult<()> {
        let from_path = self.key_to_path(source, key)?;
        let to_path = self.key_to_path(dest, key)?;
        let start = std::time::Instant::now();

        if !fs::try_exists(&from_path).await.unwrap_or(false) {
            return Err(StorageError::NotFound(key.to_string()));
        }

        self.ensure_parent_dir(&to_path).await?;

        fs::rename(&from_path, &to_path).await.map_err(|e| {
            StorageError::MoveFailed(format!(
                "Failed to move {} to {}: {}",
                from_path.display(),
                to_path.display(),
                e
            ))
        })?;

        tracing::info!(
            key = %key,
            source = %source,
            dest = %dest,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage move successful"
        );

        Ok(())
    }

    async fn signed_url(
        &self,
        container: Container,
        key: &str,
        expires_in: Duration,
    ) -> StorageResult<String> {
        let path = self.key_to_path(container, key)?;
        if !fs::try_exists(&path).await.unwrap_or(false) {
            return Err(StorageError::NotFound(key.to_string()));
        }

        let expires = std::time::SystemTime::now() + expires_in;
        let expires_unix = expires
            .duration_since(std::time::UNIX_EPOCH)
            .map_err(|e| StorageError::SignFailed(e.to_string()))?
            .as_secs();

        Ok(format!(
            "{}?expires={}&token={}",
            self.generate_url(container, key),
            expires_unix,
            Uuid::new_v4().simple()
        ))
    }

    fn public_url(&self, container: Container, key: &str) -> String {
        self.generate_url(container, key)
    }

    async fn exists(&self, container: Container, key: &str) -> StorageResult<bool> {
        let path = self.key_to_path(container, key)?;
        Ok(fs::try_exists(&path).await.unwrap_or(false))
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Local
    }
}

#[cfg(all(test, feature = "storage-local"))]
mod tests {
    use super::*;
    use tempfile::tempdir;

    async fn storage(dir: &Path) -> LocalObjectStorage {
        LocalObjectStorage::new(dir, "http://localhost:3000/files".to_string())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_put_and_exists() {
        let dir = tempdir().unwrap();
        let storage = storage(dir.path()).await;

        storage
            .put(
                Container::Public,
                "assets/x/photo.jpg",
                b"bytes".to_vec(),
                "image/jpeg",
            )
            .await
            .unwrap();

        assert!(storage
            .exists(Container::Public, "assets/x/photo.jpg")
            .await
            .unwrap());
        assert!(!storage
            .exists(Container::Private, "assets/x/photo.jpg")
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_move_between_containers_keeps_key() {
        let dir = tempdir().unwrap();
        let storage = storage(dir.path()).await;
        let key = "assets/x/photo.jpg";

        storage
            .put(Container::Public, key, b"bytes".to_vec(), "image/jpeg")
            .await
            .unwrap();

        storage
            .move_object(Container::Public, key, Container::Private)
            .await
            .unwrap();

        assert!(!storage.exists(Container::Public, key).await.unwrap());
        assert!(storage.exists(Container::Private, key).await.unwrap());
    }

    #[tokio::test]
    async fn test_move_missing_object_fails() {
        let dir = tempdir().unwrap();
        let storage = storage(dir.path()).await;

        let result = storage
            .move_object(Container::Public, "assets/x/gone.jpg", Container::Private)
            .await;
        assert!(matches!(result, Err(StorageError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_many_reports_per_key_results() {
        let dir = tempdir().unwrap();
        let storage = storage(dir.path()).await;

        storage
            .put(Container::Public, "assets/a/1.jpg", b"a".to_vec(), "image/jpeg")
            .await
            .unwrap();

        let keys = vec!["assets/a/1.jpg".to_string(), "assets/b/2.jpg".to_string()];
        let outcomes = storage.delete_many(Container::Public, &keys).await;

        assert_eq!(outcomes.len(), 2);
        assert!(outcomes[0].result.is_ok());
        assert!(matches!(
            outcomes[1].result,
            Err(StorageError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_path_traversal_rejected() {
        let dir = tempdir().unwrap();
        let storage = storage(dir.path()).await;

        let result = storage.exists(Container::Public, "../../../etc/passwd").await;
        assert!(matches!(result, Err(StorageError::InvalidKey(_))));

        let result = storage.exists(Container::Public, "/etc/passwd").await;
        assert!(matches!(result, Err(StorageError::InvalidKey(_))));
    }

    #[tokio::test]
    async fn test_signed_urls_are_distinct() {
        let dir = tempdir().unwrap();
        let storage = storage(dir.path()).await;
        let key = "assets/x/secret.pdf";

        storage
            .put(Container::Private, key, b"pdf".to_vec(), "application/pdf")
            .await
            .unwrap();

        let first = storage
            .signed_url(Container::Private, key, Duration::from_secs(60))
            .await
            .unwrap();
        let second = storage
            .signed_url(Container::Private, key, Duration::from_secs(60))
            .await
            .unwrap();

        assert_ne!(first, second);
        assert!(first.contains("expires="));
    }

    #[tokio::test]
    async fn test_public_url_is_deterministic() {
        let dir = tempdir().unwrap();
        let storage = storage(dir.path()).await;

        let url = storage.public_url(Container::Public, "assets/x/photo.jpg");
        assert_eq!(
            url,
            "http://localhost:3000/files/public/assets/x/photo.jpg"
        );
    }
}

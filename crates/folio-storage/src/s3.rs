use crate::keys::validate_key;
use crate::traits::{DeleteOutcome, ObjectStorage, StorageError, StorageResult};
use async_trait::async_trait;
use bytes::Bytes;
use folio_core::{Container, StorageBackend};
use futures::StreamExt;
use http::Method;
use object_store::aws::{AmazonS3, AmazonS3Builder};
use object_store::path::Path;
use object_store::signer::Signer;
use object_store::Error as ObjectStoreError;
use object_store::{ObjectStoreExt, PutPayload, Result as ObjectResult};
use std::time::Duration;

/// Concurrency bound for bulk deletes against one bucket.
const BULK_DELETE_CONCURRENCY: usize = 16;

/// S3 storage implementation: one bucket per container.
#[derive(Clone)]
pub struct S3ObjectStorage {
    public_store: AmazonS3,
    private_store: AmazonS3,
    public_bucket: String,
    private_bucket: String,
    region: String,
    endpoint_url: Option<String>, // Custom endpoint for S3-compatible providers
}

impl S3ObjectStorage {
    /// Create a new S3ObjectStorage instance
    ///
    /// # Arguments
    /// * `public_bucket` - bucket backing the public container
    /// * `private_bucket` - bucket backing the private container
    /// * `region` - AWS region (or region identifier for S3-compatible providers)
    /// * `endpoint_url` - Optional custom endpoint URL for S3-compatible providers
    ///   (e.g., "http://localhost:9000" for MinIO)
    pub async fn new(
        public_bucket: String,
        private_bucket: String,
        region: String,
        endpoint_url: Option<String>,
    ) -> StorageResult<Self> {
        let public_store = Self::build_store(&public_bucket, &region, endpoint_url.as_deref())?;
        let private_store = Self::build_store(&private_bucket, &region, endpoint_url.as_deref())?;

        Ok(S3ObjectStorage {
            public_store,
            private_store,
            public_bucket,
            private_bucket,
            region,
            endpoint_url,
        })
    }

    fn build_store(
        bucket: &str,
        region: &str,
        endpoint_url: Option<&str>,
    ) -> StorageResult<AmazonS3> {
        // Build AmazonS3 object store from environment and explicit settings.
        let mut builder = AmazonS3Builder::from_env()
            .with_region(region.to_string())
            .with_bucket_name(bucket.to_string());

        if let Some(endpoint) = endpoint_url {
            let allow_http = endpoint.starts_with("http://");
            builder = builder
                .with_endpoint(endpoint.to_string())
                .with_allow_http(allow_http);
        }

        builder
            .build()
            .map_err(|e| StorageError::ConfigError(e.to_string()))
    }

    fn store_for(&self, container: Container) -> &AmazonS3 {
        match container {
            Container::Public => &self.public_store,
            Container::Private => &self.private_store,
        }
    }

    fn bucket_for(&self, container: Container) -> &str {
        match container {
            Container::Public => &self.public_bucket,
            Container::Private => &self.private_bucket,
        }
    }

    /// Generate the permanent URL for an object.
    ///
    /// For AWS S3, uses the standard format: https://{bucket}.s3.{region}.amazonaws.com/{key}
    /// For S3-compatible providers, uses path-style addressing on the endpoint URL.
    fn generate_url(&self, container: Container, key: &str) -> String {
        let bucket = self.bucket_for(container);
        if let Some(ref endpoint) = self.endpoint_url {
            let base_url = endpoint.trim_end_matches('/');
            format!("{}/{}/{}", base_url, bucket, key)
        } else {
            format!("https://{}.s3.{}.amazonaws.com/{}", bucket, self.region, key)
        }
    }

    async fn delete_one(&self, container: Container, key: &str) -> StorageResult<()> {
        validate_key(key)?;
        let location = Path::from(key.to_string());
        let result: ObjectResult<_> = self.store_for(container).delete(&location).await;
        result.map_err(|e| match e {
            ObjectStoreError::NotFound { .. } => StorageError::NotFound(key.to_string()),
            other => StorageError::DeleteFailed(other.to_string()),
        })
    }
}

#[async_trait]
impl ObjectStorage for S3ObjectStorage {
    async fn put(
        &self,
        container: Container,
        key: &str,
        data: Vec<u8>,
        _content_type: &str,
    ) -> StorageResult<()> {
        validate_key(key)?;
        let size = data.len() as u64;
        let bytes = Bytes::from(data);
        let location = Path::from(key.to_string());
        let bucket = self.bucket_for(container);

        let start = std::time::Instant::now();

        let result: ObjectResult<_> = self
            .store_for(container)
            .put(&location, PutPayload::from(bytes))
            .await;

        result.map_err(|e| {
            tracing::error!(
                error = %e,
                bucket = %bucket,
                key = %key,
                size_bytes = size,
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "S3 upload failed"
            );
            StorageError::UploadFailed(e.to_string())
        })?;

        tracing::info!(
            bucket = %bucket,
            key = %key,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 upload successful"
        );

        Ok(())
    }

    async fn delete_many(&self, container: Container, keys: &[String]) -> Vec<DeleteOutcome> {
        let start = std::time::Instant::now();

        // Bounded concurrency; `buffered` keeps the caller's key order.
        let outcomes: Vec<DeleteOutcome> = futures::stream::iter(keys.iter().cloned())
            .map(|key| async move {
                let result = self.delete_one(container, &key).await;
                DeleteOutcome { key, result }
            })
            .buffered(BULK_DELETE_CONCURRENCY)
            .collect()
            .await;

        let failed = outcomes.iter().filter(|o| o.result.is_err()).count();
        tracing::info!(
            bucket = %self.bucket_for(container),
            total = keys.len(),
            failed,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 bulk delete finished"
        );

        outcomes
    }

    async fn move_object(
        &self,
        source: Container,
        key: &str,
        dest: Container,
    ) -> StorageResult<()> {
        validate_key(key)?;
        let start = std::time::Instant::now();
        let location = Path::from(key.to_string());

        // The buckets are distinct stores, so a server-side copy is not
        // available: read from the source, write to the destination, then
        // delete the source. The catalog is only updated after this returns.
        let get_result: ObjectResult<_> = self.store_for(source).get(&location).await;
        let get_result = get_result.map_err(|e| match e {
            ObjectStoreError::NotFound { .. } => StorageError::NotFound(key.to_string()),
            other => StorageError::MoveFailed(other.to_string()),
        })?;

        let bytes = get_result
            .bytes()
            .await
            .map_err(|e| StorageError::MoveFailed(e.to_string()))?;
        let size = bytes.len() as u64;

        let put_result: ObjectResult<_> = self
            .store_for(dest)
            .put(&location, PutPayload::from(bytes))
            .await;
        put_result.map_err(|e| {
            tracing::error!(
                error = %e,
                key = %key,
                source_bucket = %self.bucket_for(source),
                dest_bucket = %self.bucket_for(dest),
                "S3 move failed writing to destination"
            );
            StorageError::MoveFailed(e.to_string())
        })?;

        let delete_result: ObjectResult<_> = self.store_for(source).delete(&location).await;
        if let Err(e) = delete_result {
            // Destination copy exists; the leftover source object is cleaned
            // up on the next delete pass. Not a move failure.
            tracing::warn!(
                error = %e,
                key = %key,
                source_bucket = %self.bucket_for(source),
                "S3 move left source object behind"
            );
        }

        tracing::info!(
            key = %key,
            source_bucket = %self.bucket_for(source),
            dest_bucket = %self.bucket_for(dest),
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 move successful"
        );

        Ok(())
    }

    async fn signed_url(
        &self,
        container: Container,
        key: &str,
        expires_in: Duration,
    ) -> StorageResult<String> {
        validate_key(key)?;
        let location = Path::from(key.to_string());
        let url_result: ObjectResult<_> = self
            .store_for(container)
            .signed_url(Method::GET, &location, expires_in)
            .await;

        let url = url_result
            .map_err(|e| StorageError::SignFailed(e.to_string()))?
            .to_string();

        Ok(url)
    }

    fn public_url(&self, container: Container, key: &str) -> String {
        self.generate_url(container, key)
    }

    async fn exists(&self, container: Container, key: &str) -> StorageResult<bool> {
        validate_key(key)?;
        let location = Path::from(key.to_string());
        match self.store_for(container).head(&location).await {
            Ok(_) => Ok(true),
            Err(ObjectStoreError::NotFound { .. }) => Ok(false),
            Err(e) => Err(StorageError::BackendError(e.to_string())),
        }
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::S3
    }
}

//! Configuration module
//!
//! Env-driven configuration for the API and services: server, database,
//! storage containers, authentication, and signed-URL lifecycle settings.

use std::env;

use crate::storage_types::StorageBackend;

const DEFAULT_SERVER_PORT: u16 = 3000;
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 20;
const DEFAULT_DB_TIMEOUT_SECS: u64 = 30;
const DEFAULT_SIGNED_URL_TTL_HOURS: i64 = 24;
const DEFAULT_SIGN_TIMEOUT_SECS: u64 = 10;
const DEFAULT_PAGE_SIZE: i64 = 20;
const DEFAULT_MAX_PAGE_SIZE: i64 = 100;
const DEFAULT_MAX_UPLOAD_SIZE_BYTES: usize = 25 * 1024 * 1024;

/// Application configuration, loaded once at startup.
#[derive(Clone, Debug)]
pub struct Config {
    server_port: u16,
    environment: String,
    cors_origins: Vec<String>,
    database_url: String,
    db_max_connections: u32,
    db_timeout_seconds: u64,
    jwt_secret: String,
    storage_backend: StorageBackend,
    s3_public_bucket: Option<String>,
    s3_private_bucket: Option<String>,
    s3_region: Option<String>,
    s3_endpoint: Option<String>,
    local_storage_path: Option<String>,
    local_storage_base_url: Option<String>,
    signed_url_ttl_hours: i64,
    sign_timeout_secs: u64,
    default_page_size: i64,
    max_page_size: i64,
    max_upload_size_bytes: usize,
}

fn env_string(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.is_empty())
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|s| s.parse::<T>().ok())
        .unwrap_or(default)
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        // .env is optional; real deployments set the environment directly.
        dotenvy::dotenv().ok();

        let database_url = env_string("DATABASE_URL")
            .ok_or_else(|| anyhow::anyhow!("DATABASE_URL must be set"))?;
        let jwt_secret =
            env_string("JWT_SECRET").ok_or_else(|| anyhow::anyhow!("JWT_SECRET must be set"))?;

        let storage_backend = env_string("STORAGE_BACKEND")
            .as_deref()
            .and_then(StorageBackend::from_str_opt)
            .unwrap_or(StorageBackend::S3);

        let cors_origins = env_string("CORS_ORIGINS")
            .unwrap_or_else(|| "*".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        Ok(Config {
            server_port: env_parse("SERVER_PORT", DEFAULT_SERVER_PORT),
            environment: env_string("ENVIRONMENT").unwrap_or_else(|| "development".to_string()),
            cors_origins,
            database_url,
            db_max_connections: env_parse("DB_MAX_CONNECTIONS", DEFAULT_DB_MAX_CONNECTIONS),
            db_timeout_seconds: env_parse("DB_TIMEOUT_SECONDS", DEFAULT_DB_TIMEOUT_SECS),
            jwt_secret,
            storage_backend,
            s3_public_bucket: env_string("S3_PUBLIC_BUCKET"),
            s3_private_bucket: env_string("S3_PRIVATE_BUCKET"),
            s3_region: env_string("S3_REGION").or_else(|| env_string("AWS_REGION")),
            s3_endpoint: env_string("S3_ENDPOINT"),
            local_storage_path: env_string("LOCAL_STORAGE_PATH"),
            local_storage_base_url: env_string("LOCAL_STORAGE_BASE_URL"),
            signed_url_ttl_hours: env_parse("SIGNED_URL_TTL_HOURS", DEFAULT_SIGNED_URL_TTL_HOURS),
            sign_timeout_secs: env_parse("SIGN_TIMEOUT_SECS", DEFAULT_SIGN_TIMEOUT_SECS),
            default_page_size: env_parse("DEFAULT_PAGE_SIZE", DEFAULT_PAGE_SIZE),
            max_page_size: env_parse("MAX_PAGE_SIZE", DEFAULT_MAX_PAGE_SIZE),
            max_upload_size_bytes: env_parse(
                "MAX_UPLOAD_SIZE_BYTES",
                DEFAULT_MAX_UPLOAD_SIZE_BYTES,
            ),
        })
    }

    /// Fail fast on misconfiguration before any service starts.
    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.jwt_secret.len() < 32 {
            anyhow::bail!("JWT_SECRET must be at least 32 characters");
        }
        if self.signed_url_ttl_hours <= 0 {
            anyhow::bail!("SIGNED_URL_TTL_HOURS must be positive");
        }
        if self.default_page_size <= 0 || self.max_page_size <= 0 {
            anyhow::bail!("page sizes must be positive");
        }
        match self.storage_backend {
            StorageBackend::S3 => {
                if self.s3_public_bucket.is_none() || self.s3_private_bucket.is_none() {
                    anyhow::bail!(
                        "S3_PUBLIC_BUCKET and S3_PRIVATE_BUCKET must be set for the S3 backend"
                    );
                }
                if self.s3_region.is_none() {
                    anyhow::bail!("S3_REGION or AWS_REGION must be set for the S3 backend");
                }
            }
            StorageBackend::Local => {
                if self.local_storage_path.is_none() || self.local_storage_base_url.is_none() {
                    anyhow::bail!(
                        "LOCAL_STORAGE_PATH and LOCAL_STORAGE_BASE_URL must be set for the local backend"
                    );
                }
            }
        }
        Ok(())
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    pub fn server_port(&self) -> u16 {
        self.server_port
    }

    pub fn environment(&self) -> &str {
        &self.environment
    }

    pub fn cors_origins(&self) -> &[String] {
        &self.cors_origins
    }

    pub fn database_url(&self) -> &str {
        &self.database_url
    }

    pub fn db_max_connections(&self) -> u32 {
        self.db_max_connections
    }

    pub fn db_timeout_seconds(&self) -> u64 {
        self.db_timeout_seconds
    }

    pub fn jwt_secret(&self) -> &str {
        &self.jwt_secret
    }

    pub fn storage_backend(&self) -> StorageBackend {
        self.storage_backend
    }

    pub fn s3_public_bucket(&self) -> Option<&str> {
        self.s3_public_bucket.as_deref()
    }

    pub fn s3_private_bucket(&self) -> Option<&str> {
        self.s3_private_bucket.as_deref()
    }

    pub fn s3_region(&self) -> Option<&str> {
        self.s3_region.as_deref()
    }

    pub fn s3_endpoint(&self) -> Option<&str> {
        self.s3_endpoint.as_deref()
    }

    pub fn local_storage_path(&self) -> Option<&str> {
        self.local_storage_path.as_deref()
    }

    pub fn local_storage_base_url(&self) -> Option<&str> {
        self.local_storage_base_url.as_deref()
    }

    /// TTL for private signed URLs. Staleness is repaired on the read path.
    pub fn signed_url_ttl(&self) -> chrono::Duration {
        chrono::Duration::hours(self.signed_url_ttl_hours)
    }

    /// Bound on a single signing call so one slow backend does not stall a page.
    pub fn sign_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.sign_timeout_secs)
    }

    pub fn default_page_size(&self) -> i64 {
        self.default_page_size
    }

    pub fn max_page_size(&self) -> i64 {
        self.max_page_size
    }

    pub fn max_upload_size_bytes(&self) -> usize {
        self.max_upload_size_bytes
    }
}

//! In-memory doubles for service tests
//!
//! `InMemoryCatalog` mirrors the repository's query semantics (keyset
//! pagination, compare-and-set visibility) over a `Vec` behind a mutex.
//! `MockStorage` records calls and can be told to fail specific operations.

use crate::auth::models::{AuthContext, UserRole};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use folio_core::models::{MediaAsset, PageCursor, Visibility};
use folio_core::{AppError, Config, Container, StorageBackend};
use folio_db::{AssetCatalog, NewAsset, UrlUpdate};
use folio_storage::{DeleteOutcome, ObjectStorage, StorageError, StorageResult};
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration as StdDuration;
use uuid::Uuid;

pub fn admin_ctx() -> AuthContext {
    AuthContext {
        user_id: Uuid::new_v4(),
        role: UserRole::Admin,
    }
}

pub fn editor_ctx() -> AuthContext {
    AuthContext {
        user_id: Uuid::new_v4(),
        role: UserRole::Editor,
    }
}

/// Config with test-friendly defaults, loaded through the normal env path.
pub fn test_config() -> Config {
    std::env::set_var("DATABASE_URL", "postgres://localhost/folio-test");
    std::env::set_var("JWT_SECRET", "0123456789abcdef0123456789abcdef");
    std::env::set_var("STORAGE_BACKEND", "local");
    std::env::set_var("LOCAL_STORAGE_PATH", "/tmp/folio-test");
    std::env::set_var("LOCAL_STORAGE_BASE_URL", "http://localhost:3000/files");
    Config::from_env().expect("test config")
}

/// Builder for seeded catalog rows.
pub struct TestAsset {
    name: String,
    visibility: Visibility,
    url: Option<(String, i64)>,
    uploaded_hours_ago: i64,
    uploaded_at: Option<DateTime<Utc>>,
}

impl TestAsset {
    pub fn public(name: &str) -> Self {
        Self {
            name: name.to_string(),
            visibility: Visibility::Public,
            url: None,
            uploaded_hours_ago: 0,
            uploaded_at: None,
        }
    }

    pub fn private(name: &str) -> Self {
        Self {
            name: name.to_string(),
            visibility: Visibility::Private,
            url: None,
            uploaded_hours_ago: 0,
            uploaded_at: None,
        }
    }

    /// Cached access URL issued the given number of hours ago.
    pub fn with_url(mut self, url: &str, issued_hours_ago: i64) -> Self {
        self.url = Some((url.to_string(), issued_hours_ago));
        self
    }

    pub fn uploaded_hours_ago(mut self, hours: i64) -> Self {
        self.uploaded_hours_ago = hours;
        self
    }

    /// Exact upload timestamp, for seeding rows that tie on `uploaded_at`.
    pub fn uploaded_at(mut self, at: DateTime<Utc>) -> Self {
        self.uploaded_at = Some(at);
        self
    }

    fn build(self) -> MediaAsset {
        let id = Uuid::new_v4();
        // Postgres stores TIMESTAMPTZ at microsecond precision and the page
        // cursor round-trips through micros; keep the double faithful.
        let truncate = |t: DateTime<Utc>| {
            DateTime::from_timestamp_micros(t.timestamp_micros()).expect("in-range timestamp")
        };
        let now = truncate(Utc::now());
        let storage_key = format!("assets/{}/{}", id, self.name);
        let (access_url, url_issued_at) = match (&self.visibility, self.url) {
            (Visibility::Public, _) => (
                Some(format!("https://cdn.example/public/{}", storage_key)),
                None,
            ),
            (Visibility::Private, Some((url, hours))) => {
                (Some(url), Some(now - Duration::hours(hours)))
            }
            (Visibility::Private, None) => (None, None),
        };
        MediaAsset {
            id,
            name: self.name,
            storage_key,
            visibility: self.visibility,
            access_url,
            url_issued_at,
            uploaded_at: self
                .uploaded_at
                .map(truncate)
                .unwrap_or(now - Duration::hours(self.uploaded_hours_ago)),
            size_bytes: 1024,
            content_type: "application/octet-stream".to_string(),
            updated_at: now,
        }
    }
}

#[derive(Default)]
pub struct InMemoryCatalog {
    assets: Mutex<Vec<MediaAsset>>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn seed(&self, asset: TestAsset) -> MediaAsset {
        let asset = asset.build();
        self.assets.lock().unwrap().push(asset.clone());
        asset
    }

    /// Mutate a row directly, bypassing the CAS (simulates a concurrent writer).
    pub fn set_visibility_direct(&self, id: Uuid, visibility: Visibility) {
        let mut assets = self.assets.lock().unwrap();
        if let Some(a) = assets.iter_mut().find(|a| a.id == id) {
            a.visibility = visibility;
        }
    }

    pub fn len(&self) -> usize {
        self.assets.lock().unwrap().len()
    }
}

#[async_trait]
impl AssetCatalog for InMemoryCatalog {
    async fn get(&self, id: Uuid) -> Result<Option<MediaAsset>, AppError> {
        Ok(self
            .assets
            .lock()
            .unwrap()
            .iter()
            .find(|a| a.id == id)
            .cloned())
    }

    async fn get_many(&self, ids: &[Uuid]) -> Result<Vec<MediaAsset>, AppError> {
        Ok(self
            .assets
            .lock()
            .unwrap()
            .iter()
            .filter(|a| ids.contains(&a.id))
            .cloned()
            .collect())
    }

    async fn list_page(
        &self,
        cursor: Option<PageCursor>,
        limit: i64,
    ) -> Result<Vec<MediaAsset>, AppError> {
        let mut assets: Vec<MediaAsset> = self
            .assets
            .lock()
            .unwrap()
            .iter()
            .filter(|a| {
                cursor
                    .map(|c| (a.uploaded_at, a.id) < (c.uploaded_at, c.id))
                    .unwrap_or(true)
            })
            .cloned()
            .collect();
        assets.sort_by(|a, b| {
            b.uploaded_at
                .cmp(&a.uploaded_at)
                .then(b.id.cmp(&a.id))
        });
        assets.truncate(limit as usize);
        Ok(assets)
    }

    async fn insert(&self, asset: NewAsset) -> Result<MediaAsset, AppError> {
        let now = Utc::now();
        let row = MediaAsset {
            id: asset.id,
            name: asset.name,
            storage_key: asset.storage_key,
            visibility: asset.visibility,
            access_url: asset.access_url,
            url_issued_at: asset.url_issued_at,
            uploaded_at: now,
            size_bytes: asset.size_bytes,
            content_type: asset.content_type,
            updated_at: now,
        };
        self.assets.lock().unwrap().push(row.clone());
        Ok(row)
    }

    async fn update_access_url(&self, id: Uuid, update: UrlUpdate) -> Result<(), AppError> {
        let mut assets = self.assets.lock().unwrap();
        if let Some(a) = assets.iter_mut().find(|a| a.id == id) {
            a.access_url = Some(update.access_url);
            a.url_issued_at = Some(update.issued_at);
        }
        Ok(())
    }

    async fn set_visibility(
        &self,
        id: Uuid,
        expected: Visibility,
        new_visibility: Visibility,
        access_url: Option<String>,
        url_issued_at: Option<DateTime<Utc>>,
    ) -> Result<Option<MediaAsset>, AppError> {
        let mut assets = self.assets.lock().unwrap();
        match assets
            .iter_mut()
            .find(|a| a.id == id && a.visibility == expected)
        {
            Some(a) => {
                a.visibility = new_visibility;
                a.access_url = access_url;
                a.url_issued_at = url_issued_at;
                a.updated_at = Utc::now();
                Ok(Some(a.clone()))
            }
            None => Ok(None),
        }
    }

    async fn delete_many(&self, ids: &[Uuid]) -> Result<u64, AppError> {
        let mut assets = self.assets.lock().unwrap();
        let before = assets.len();
        assets.retain(|a| !ids.contains(&a.id));
        Ok((before - assets.len()) as u64)
    }
}

type MoveRecord = (Container, String, Container);
type OnMove = Box<dyn Fn() + Send + Sync>;

#[derive(Default)]
pub struct MockStorage {
    sign_calls: AtomicUsize,
    fail_sign: AtomicBool,
    fail_move: AtomicBool,
    fail_put: AtomicBool,
    failing_deletes: Mutex<HashSet<String>>,
    missing_objects: Mutex<HashSet<String>>,
    puts: Mutex<Vec<(Container, String)>>,
    moves: Mutex<Vec<MoveRecord>>,
    deletes: Mutex<Vec<(Container, Vec<String>)>>,
    on_move: Mutex<Option<OnMove>>,
}

impl MockStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_signing(&self) {
        self.fail_sign.store(true, Ordering::SeqCst);
    }

    pub fn fail_moves(&self) {
        self.fail_move.store(true, Ordering::SeqCst);
    }

    pub fn fail_puts(&self) {
        self.fail_put.store(true, Ordering::SeqCst);
    }

    /// Make deleting the given key fail with a backend error.
    pub fn fail_delete_of(&self, key: &str) {
        self.failing_deletes.lock().unwrap().insert(key.to_string());
    }

    /// Make the given key report NotFound on delete.
    pub fn missing_object(&self, key: &str) {
        self.missing_objects.lock().unwrap().insert(key.to_string());
    }

    /// Hook invoked after a successful move (simulates a concurrent writer).
    pub fn on_move(&self, f: impl Fn() + Send + Sync + 'static) {
        *self.on_move.lock().unwrap() = Some(Box::new(f));
    }

    pub fn sign_calls(&self) -> usize {
        self.sign_calls.load(Ordering::SeqCst)
    }

    pub fn puts(&self) -> Vec<(Container, String)> {
        self.puts.lock().unwrap().clone()
    }

    pub fn moves(&self) -> Vec<MoveRecord> {
        self.moves.lock().unwrap().clone()
    }

    pub fn deletes(&self) -> Vec<(Container, Vec<String>)> {
        self.deletes.lock().unwrap().clone()
    }
}

#[async_trait]
impl ObjectStorage for MockStorage {
    async fn put(
        &self,
        container: Container,
        key: &str,
        _data: Vec<u8>,
        _content_type: &str,
    ) -> StorageResult<()> {
        if self.fail_put.load(Ordering::SeqCst) {
            return Err(StorageError::UploadFailed("mock upload failure".to_string()));
        }
        self.puts
            .lock()
            .unwrap()
            .push((container, key.to_string()));
        Ok(())
    }

    async fn delete_many(&self, container: Container, keys: &[String]) -> Vec<DeleteOutcome> {
        self.deletes
            .lock()
            .unwrap()
            .push((container, keys.to_vec()));
        keys.iter()
            .map(|key| {
                let result = if self.failing_deletes.lock().unwrap().contains(key) {
                    Err(StorageError::DeleteFailed("mock delete failure".to_string()))
                } else if self.missing_objects.lock().unwrap().contains(key) {
                    Err(StorageError::NotFound(key.clone()))
                } else {
                    Ok(())
                };
                DeleteOutcome {
                    key: key.clone(),
                    result,
                }
            })
            .collect()
    }

    async fn move_object(
        &self,
        source: Container,
        key: &str,
        dest: Container,
    ) -> StorageResult<()> {
        if self.fail_move.load(Ordering::SeqCst) {
            return Err(StorageError::MoveFailed("mock move failure".to_string()));
        }
        self.moves
            .lock()
            .unwrap()
            .push((source, key.to_string(), dest));
        if let Some(f) = self.on_move.lock().unwrap().as_ref() {
            f();
        }
        Ok(())
    }

    async fn signed_url(
        &self,
        _container: Container,
        key: &str,
        _expires_in: StdDuration,
    ) -> StorageResult<String> {
        self.sign_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_sign.load(Ordering::SeqCst) {
            return Err(StorageError::SignFailed("mock signer down".to_string()));
        }
        Ok(format!(
            "https://signed.example/{}?token={}",
            key,
            Uuid::new_v4().simple()
        ))
    }

    fn public_url(&self, container: Container, key: &str) -> String {
        format!("https://cdn.example/{}/{}", container, key)
    }

    async fn exists(&self, _container: Container, _key: &str) -> StorageResult<bool> {
        Ok(true)
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Local
    }
}

//! Shared key generation and validation for storage backends.
//!
//! Key format: `assets/{asset_id}/{filename}`. The key is assigned once at
//! upload and never changes; visibility flips move the object between
//! containers under the same key.

use crate::traits::{StorageError, StorageResult};
use uuid::Uuid;

/// Generate a storage key for the given asset id and filename.
///
/// All backends must use this format for consistency.
pub fn generate_storage_key(asset_id: Uuid, filename: &str) -> String {
    format!("assets/{}/{}", asset_id, filename)
}

/// Reject keys that could escape the storage namespace.
pub fn validate_key(key: &str) -> StorageResult<()> {
    if key.is_empty() || key.contains("..") || key.starts_with('/') {
        return Err(StorageError::InvalidKey(
            "Storage key contains invalid characters".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_storage_key_format() {
        let id = Uuid::new_v4();
        let key = generate_storage_key(id, "photo.jpg");
        assert_eq!(key, format!("assets/{}/photo.jpg", id));
    }

    #[test]
    fn test_validate_key_rejects_traversal() {
        assert!(validate_key("../etc/passwd").is_err());
        assert!(validate_key("/etc/passwd").is_err());
        assert!(validate_key("").is_err());
        assert!(validate_key("assets/x/photo.jpg").is_ok());
    }
}

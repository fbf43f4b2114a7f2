//! Storage backend and container identifiers.
//!
//! These live in core (rather than the storage crate) so the catalog and API
//! crates can name them without depending on storage implementation details.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Storage backend type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    S3,
    Local,
}

impl StorageBackend {
    pub fn from_str_opt(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "s3" => Some(StorageBackend::S3),
            "local" => Some(StorageBackend::Local),
            _ => None,
        }
    }
}

/// Logical object-storage namespace.
///
/// The public container is addressable by stable permanent URLs; the private
/// container only through short-lived signed URLs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Container {
    Public,
    Private,
}

impl fmt::Display for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Container::Public => write!(f, "public"),
            Container::Private => write!(f, "private"),
        }
    }
}

//! Asset lifecycle services
//!
//! Business logic between the HTTP handlers and the catalog/storage layers.
//! Services depend on the `AssetCatalog` and `ObjectStorage` traits so they
//! can be exercised against in-memory doubles.

pub mod deletion;
pub mod listing;
pub mod upload;
pub mod visibility;

#[cfg(test)]
pub mod testing;

pub use deletion::{DeletionService, DeletionSummary};
pub use listing::ListingService;
pub use upload::UploadService;
pub use visibility::VisibilityService;

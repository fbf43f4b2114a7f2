pub mod asset;

pub use asset::{AssetPage, MediaAsset, PageCursor, Visibility};

//! HTTP request handlers

pub mod asset_get;
pub mod asset_upload;
pub mod asset_visibility;
pub mod assets_delete;
pub mod assets_list;
pub mod health;

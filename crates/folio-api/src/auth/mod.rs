//! Authentication and authorization
//!
//! Bearer JWT (HS256) validation plus the request-scoped `AuthContext`
//! extractor used by handlers.

pub mod jwt;
pub mod middleware;
pub mod models;

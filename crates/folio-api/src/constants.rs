//! API-wide constants

/// Route prefix for all versioned endpoints.
pub const API_PREFIX: &str = "/api/v0";

/// Upper bound on ids accepted by the batch delete endpoint.
pub const MAX_BATCH_DELETE_SIZE: usize = 50;

use crate::error::ErrorResponse;
use axum::extract::FromRequestParts;
use axum::http::{request::Parts, StatusCode};
use axum::Json;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use utoipa::ToSchema;
use uuid::Uuid;

/// User role for authorization
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    Editor,
}

impl Display for UserRole {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            UserRole::Admin => write!(f, "admin"),
            UserRole::Editor => write!(f, "editor"),
        }
    }
}

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: Uuid,    // user_id
    pub role: String, // "admin" or "editor"
    pub exp: i64,     // expiration timestamp
    pub iat: i64,     // issued at timestamp
}

/// Authenticated caller, extracted from a validated JWT and stored in
/// request extensions by the auth middleware.
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub user_id: Uuid,
    pub role: UserRole,
}

impl AuthContext {
    /// Guard for admin-only operations.
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

// Implement FromRequestParts for AuthContext to work with Multipart
// Extension cannot be used with Multipart, so we extract directly from request parts
impl<S> FromRequestParts<S> for AuthContext
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, Json<ErrorResponse>);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthContext>()
            .cloned()
            .ok_or_else(|| {
                (
                    StatusCode::UNAUTHORIZED,
                    Json(ErrorResponse {
                        error: "Missing authentication context".to_string(),
                        details: None,
                        error_type: None,
                        code: "MISSING_AUTH_CONTEXT".to_string(),
                        recoverable: false,
                        suggested_action: Some("Check authentication token".to_string()),
                    }),
                )
            })
    }
}

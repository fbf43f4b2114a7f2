//! HS256 JWT validation
//!
//! Tokens are issued by the companion CMS frontend with a shared secret; this
//! service only validates them.

use crate::auth::models::{AuthContext, SessionClaims, UserRole};
use folio_core::AppError;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};

#[derive(Clone)]
pub struct JwtService {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtService {
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;

        Self {
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    /// Validate a bearer token and build the caller's context.
    pub fn validate(&self, token: &str) -> Result<AuthContext, AppError> {
        let data = decode::<SessionClaims>(token, &self.decoding_key, &self.validation).map_err(
            |e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                    AppError::Unauthorized("Token has expired".to_string())
                }
                jsonwebtoken::errors::ErrorKind::InvalidSignature => {
                    AppError::Unauthorized("Invalid token signature".to_string())
                }
                _ => AppError::Unauthorized(format!("Invalid token: {}", e)),
            },
        )?;

        let role = match data.claims.role.as_str() {
            "admin" => UserRole::Admin,
            "editor" => UserRole::Editor,
            other => {
                return Err(AppError::Unauthorized(format!(
                    "Unknown role in token: {}",
                    other
                )))
            }
        };

        Ok(AuthContext {
            user_id: data.claims.sub,
            role,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use uuid::Uuid;

    const SECRET: &str = "0123456789abcdef0123456789abcdef";

    fn token_for(role: &str, exp_offset_secs: i64) -> String {
        let now = Utc::now().timestamp();
        let claims = SessionClaims {
            sub: Uuid::new_v4(),
            role: role.to_string(),
            exp: now + exp_offset_secs,
            iat: now,
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn test_validate_admin_token() {
        let service = JwtService::new(SECRET);
        let ctx = service.validate(&token_for("admin", 3600)).unwrap();
        assert_eq!(ctx.role, UserRole::Admin);
    }

    #[test]
    fn test_validate_editor_token() {
        let service = JwtService::new(SECRET);
        let ctx = service.validate(&token_for("editor", 3600)).unwrap();
        assert_eq!(ctx.role, UserRole::Editor);
    }

    #[test]
    fn test_rejects_expired_token() {
        let service = JwtService::new(SECRET);
        let result = service.validate(&token_for("admin", -3600));
        match result {
            Err(AppError::Unauthorized(msg)) => assert!(msg.contains("expired")),
            other => panic!("Expected Unauthorized, got {:?}", other.map(|c| c.role)),
        }
    }

    #[test]
    fn test_rejects_wrong_secret() {
        let service = JwtService::new("another-secret-another-secret-xx");
        assert!(service.validate(&token_for("admin", 3600)).is_err());
    }

    #[test]
    fn test_rejects_unknown_role() {
        let service = JwtService::new(SECRET);
        assert!(service.validate(&token_for("superuser", 3600)).is_err());
    }
}

//! Bearer token authentication for management routes.

use axum::{
    body::Body,
    extract::State,
    http::{header::AUTHORIZATION, HeaderMap, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};
use shared::jwt::{extract_user_id, JwtConfig};
use uuid::Uuid;

use crate::app::AppState;
use crate::error::ApiError;

/// Authenticated user information extracted from an access token.
#[derive(Debug, Clone)]
pub struct UserAuth {
    /// User ID from the `sub` claim.
    pub user_id: Uuid,
}

impl UserAuth {
    /// Validates an access token.
    pub fn validate(jwt_config: &JwtConfig, token: &str) -> Result<Self, ApiError> {
        let claims = jwt_config.validate_access_token(token).map_err(|e| {
            tracing::debug!(error = %e, "Access token rejected");
            ApiError::Unauthorized("Invalid or expired token".to_string())
        })?;
        let user_id = extract_user_id(&claims)
            .map_err(|_| ApiError::Unauthorized("Invalid or expired token".to_string()))?;

        Ok(UserAuth { user_id })
    }

    /// Reads and validates the `Authorization: Bearer` header.
    pub fn from_headers(jwt_config: &JwtConfig, headers: &HeaderMap) -> Result<Self, ApiError> {
        let token = headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .ok_or_else(|| {
                ApiError::Unauthorized("Missing or invalid Authorization header".to_string())
            })?;

        Self::validate(jwt_config, token)
    }
}

/// Rejects requests without a valid bearer token and stores the
/// authenticated user in request extensions.
pub async fn require_user_auth(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    match UserAuth::from_headers(&state.jwt, req.headers()) {
        Ok(auth) => {
            req.extensions_mut().insert(auth);
            next.run(req).await
        }
        Err(e) => e.into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn jwt() -> JwtConfig {
        JwtConfig::from_secret("unit-test-secret", 3600)
    }

    #[test]
    fn test_valid_bearer_token() {
        let jwt = jwt();
        let user_id = Uuid::new_v4();
        let token = jwt.generate_access_token(user_id).unwrap();

        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", token)).unwrap(),
        );

        let auth = UserAuth::from_headers(&jwt, &headers).unwrap();
        assert_eq!(auth.user_id, user_id);
    }

    #[test]
    fn test_missing_header() {
        let err = UserAuth::from_headers(&jwt(), &HeaderMap::new()).unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized(_)));
    }

    #[test]
    fn test_wrong_scheme() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert!(UserAuth::from_headers(&jwt(), &headers).is_err());
    }

    #[test]
    fn test_token_signed_with_other_key() {
        let other = JwtConfig::from_secret("another-secret", 3600);
        let token = other.generate_access_token(Uuid::new_v4()).unwrap();
        assert!(UserAuth::validate(&jwt(), &token).is_err());
    }
}

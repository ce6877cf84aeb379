//! Project key extractor for the evaluation endpoint.

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use shared::crypto::is_well_formed_project_key;

use crate::error::ApiError;

pub const PROJECT_KEY_HEADER: &str = "x-project-key";

/// Project key taken from the `X-Project-Key` header.
///
/// Only the shape of the key is checked here. A well-formed key that belongs
/// to no project resolves to not found during evaluation.
#[derive(Debug, Clone)]
pub struct ProjectKey(pub String);

#[async_trait]
impl<S> FromRequestParts<S> for ProjectKey
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let key = parts
            .headers
            .get(PROJECT_KEY_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .ok_or_else(|| ApiError::Unauthorized("Missing X-Project-Key header".to_string()))?;

        if !is_well_formed_project_key(key) {
            return Err(ApiError::Unauthorized("Malformed project key".to_string()));
        }

        Ok(ProjectKey(key.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    async fn extract(header: Option<&str>) -> Result<ProjectKey, ApiError> {
        let mut builder = Request::builder().uri("/");
        if let Some(value) = header {
            builder = builder.header("X-Project-Key", value);
        }
        let (mut parts, _) = builder.body(()).unwrap().into_parts();
        ProjectKey::from_request_parts(&mut parts, &()).await
    }

    #[tokio::test]
    async fn test_well_formed_key() {
        let key = shared::crypto::generate_project_key();
        assert_eq!(extract(Some(key.as_str())).await.unwrap().0, key);
    }

    #[tokio::test]
    async fn test_missing_key() {
        assert!(matches!(extract(None).await, Err(ApiError::Unauthorized(_))));
    }

    #[tokio::test]
    async fn test_malformed_key() {
        assert!(matches!(
            extract(Some("not a key")).await,
            Err(ApiError::Unauthorized(_))
        ));
    }
}

//! Account registration, login and password changes.

use domain::error::{DuplicateField, StoreError};
use domain::models::user::{
    ChangePasswordRequest, LoginRequest, RegisterRequest, TokenResponse,
};
use domain::models::{NewUser, User};
use domain::store::UserStore;
use shared::jwt::{JwtConfig, JwtError};
use shared::password::{hash_password, verify_password, PasswordError};
use std::sync::Arc;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::error::ApiError;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Username already taken")]
    UsernameTaken,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("User not found")]
    UserNotFound,

    #[error("Token error: {0}")]
    TokenError(#[from] JwtError),

    #[error("Password error: {0}")]
    PasswordError(#[from] PasswordError),

    #[error("Store error: {0}")]
    StoreError(#[from] StoreError),
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::UsernameTaken => ApiError::Conflict(err.to_string()),
            AuthError::InvalidCredentials => ApiError::Unauthorized(err.to_string()),
            AuthError::UserNotFound => ApiError::NotFound(err.to_string()),
            AuthError::StoreError(StoreError::Unavailable(_) | StoreError::Conflict(_)) => {
                tracing::warn!(error = %err, "Transient store failure during authentication");
                ApiError::ServiceUnavailable(
                    "The store is temporarily unavailable, retry the request".into(),
                )
            }
            AuthError::TokenError(_) | AuthError::PasswordError(_) | AuthError::StoreError(_) => {
                ApiError::Internal(err.to_string())
            }
        }
    }
}

/// Issues access tokens for accounts kept in a [`UserStore`].
#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserStore>,
    jwt: Arc<JwtConfig>,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserStore>, jwt: Arc<JwtConfig>) -> Self {
        Self { users, jwt }
    }

    /// Creates an account. The request must already be validated.
    pub async fn register(&self, req: &RegisterRequest) -> Result<User, AuthError> {
        let password_hash = hash_password(&req.password)?;

        let user = self
            .users
            .insert_user(NewUser {
                username: req.username.clone(),
                display_name: req.name.clone(),
                email: req.email.to_lowercase(),
                password_hash,
            })
            .await
            .map_err(|e| match e {
                StoreError::Duplicate(DuplicateField::Username) => AuthError::UsernameTaken,
                other => other.into(),
            })?;

        info!(user_id = %user.id, "User registered");
        Ok(user)
    }

    /// Checks credentials and issues an access token.
    ///
    /// Unknown usernames and wrong passwords are indistinguishable to the
    /// caller.
    pub async fn login(&self, req: &LoginRequest) -> Result<TokenResponse, AuthError> {
        let user = self
            .users
            .find_user_by_username(&req.username)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !verify_password(&req.password, &user.password_hash)? {
            return Err(AuthError::InvalidCredentials);
        }

        let access_token = self.jwt.generate_access_token(user.id)?;
        info!(user_id = %user.id, "User logged in");

        Ok(TokenResponse {
            access_token,
            token_type: "Bearer".to_string(),
            expires_in: self.jwt.access_token_expiry_secs,
        })
    }

    pub async fn change_password(
        &self,
        user_id: Uuid,
        req: &ChangePasswordRequest,
    ) -> Result<(), AuthError> {
        let user = self
            .users
            .find_user_by_id(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        if !verify_password(&req.current_password, &user.password_hash)? {
            return Err(AuthError::InvalidCredentials);
        }

        let password_hash = hash_password(&req.new_password)?;
        if self.users.update_password(user.id, &password_hash).await? == 0 {
            return Err(AuthError::UserNotFound);
        }

        info!(user_id = %user.id, "Password changed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::store::InMemoryStore;

    fn service() -> AuthService {
        AuthService::new(
            Arc::new(InMemoryStore::new()),
            Arc::new(JwtConfig::from_secret("auth-service-test", 900)),
        )
    }

    fn register_request(username: &str) -> RegisterRequest {
        RegisterRequest {
            username: username.to_string(),
            name: "Alice".to_string(),
            email: "Alice@Example.com".to_string(),
            password: "correct-horse".to_string(),
        }
    }

    fn login_request(username: &str, password: &str) -> LoginRequest {
        LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        }
    }

    #[tokio::test]
    async fn test_register_then_login() {
        let auth = service();
        let user = auth.register(&register_request("alice")).await.unwrap();
        assert_eq!(user.email, "alice@example.com");
        assert_ne!(user.password_hash, "correct-horse");

        let token = auth
            .login(&login_request("alice", "correct-horse"))
            .await
            .unwrap();
        assert_eq!(token.token_type, "Bearer");
        assert_eq!(token.expires_in, 900);

        let claims = auth.jwt.validate_access_token(&token.access_token).unwrap();
        assert_eq!(claims.sub, user.id.to_string());
    }

    #[tokio::test]
    async fn test_duplicate_username() {
        let auth = service();
        auth.register(&register_request("alice")).await.unwrap();

        let err = auth.register(&register_request("alice")).await.unwrap_err();
        assert!(matches!(err, AuthError::UsernameTaken));
    }

    #[tokio::test]
    async fn test_login_rejects_wrong_password_and_unknown_user() {
        let auth = service();
        auth.register(&register_request("alice")).await.unwrap();

        assert!(matches!(
            auth.login(&login_request("alice", "wrong-password")).await,
            Err(AuthError::InvalidCredentials)
        ));
        assert!(matches!(
            auth.login(&login_request("bob", "correct-horse")).await,
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn test_change_password() {
        let auth = service();
        let user = auth.register(&register_request("alice")).await.unwrap();

        let wrong = ChangePasswordRequest {
            current_password: "not-it-at-all".to_string(),
            new_password: "battery-staple".to_string(),
        };
        assert!(matches!(
            auth.change_password(user.id, &wrong).await,
            Err(AuthError::InvalidCredentials)
        ));

        let req = ChangePasswordRequest {
            current_password: "correct-horse".to_string(),
            new_password: "battery-staple".to_string(),
        };
        auth.change_password(user.id, &req).await.unwrap();

        assert!(auth
            .login(&login_request("alice", "correct-horse"))
            .await
            .is_err());
        assert!(auth
            .login(&login_request("alice", "battery-staple"))
            .await
            .is_ok());
    }

    #[test]
    fn test_auth_error_mapping() {
        use axum::http::StatusCode;

        assert_eq!(
            ApiError::from(AuthError::UsernameTaken).status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError::from(AuthError::InvalidCredentials).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::from(AuthError::StoreError(StoreError::Unavailable("down".into()))).status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }
}

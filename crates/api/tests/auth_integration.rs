//! Integration tests for account registration, login and password changes.

mod common;

use axum::http::StatusCode;
use common::{TestApp, TestUser};
use serde_json::json;

#[tokio::test]
async fn test_register_returns_user_without_password() {
    let app = TestApp::new();
    let user = TestUser::new();

    let (status, body) = app
        .post("/api/v1/auth/register", None, user.register_body())
        .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["username"], user.username);
    assert_eq!(body["email"], user.email.to_lowercase());
    assert!(body.get("id").is_some());
    assert!(body.get("password").is_none());
    assert!(body.get("password_hash").is_none());
}

#[tokio::test]
async fn test_register_duplicate_username() {
    let app = TestApp::new();
    let user = TestUser::new();

    let (status, _) = app
        .post("/api/v1/auth/register", None, user.register_body())
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = app
        .post("/api/v1/auth/register", None, user.register_body())
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "conflict");
}

#[tokio::test]
async fn test_register_validation_errors() {
    let app = TestApp::new();

    let (status, body) = app
        .post(
            "/api/v1/auth/register",
            None,
            json!({
                "username": "Bad Name",
                "name": "Test User",
                "email": "not-an-email",
                "password": "short",
            }),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");
    assert_eq!(body["details"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_login_success() {
    let app = TestApp::new();
    let user = TestUser::new();
    app.post("/api/v1/auth/register", None, user.register_body())
        .await;

    let (status, body) = app.post("/api/v1/auth/login", None, user.login_body()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["token_type"], "Bearer");
    assert_eq!(body["expires_in"], 3600);
    assert!(!body["access_token"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn test_login_wrong_password() {
    let app = TestApp::new();
    let user = TestUser::new();
    app.post("/api/v1/auth/register", None, user.register_body())
        .await;

    let (status, body) = app
        .post(
            "/api/v1/auth/login",
            None,
            json!({ "username": user.username, "password": "WrongPassword1!" }),
        )
        .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "unauthorized");
}

#[tokio::test]
async fn test_login_unknown_user() {
    let app = TestApp::new();
    let user = TestUser::new();

    let (status, _) = app.post("/api/v1/auth/login", None, user.login_body()).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_change_password() {
    let app = TestApp::new();
    let user = TestUser::new();
    app.post("/api/v1/auth/register", None, user.register_body())
        .await;
    let (_, body) = app.post("/api/v1/auth/login", None, user.login_body()).await;
    let token = body["access_token"].as_str().unwrap().to_string();

    let (status, _) = app
        .post(
            "/api/v1/auth/change-password",
            Some(&token),
            json!({ "current_password": user.password, "new_password": "N3wP@ssword!" }),
        )
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = app.post("/api/v1/auth/login", None, user.login_body()).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app
        .post(
            "/api/v1/auth/login",
            None,
            json!({ "username": user.username, "password": "N3wP@ssword!" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_change_password_requires_token() {
    let app = TestApp::new();

    let (status, body) = app
        .post(
            "/api/v1/auth/change-password",
            None,
            json!({ "current_password": "whatever1", "new_password": "N3wP@ssword!" }),
        )
        .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "unauthorized");
}

#[tokio::test]
async fn test_invalid_token_rejected() {
    let app = TestApp::new();

    let (status, _) = app
        .post(
            "/api/v1/projects",
            Some("not.a.token"),
            json!({ "name": "acme" }),
        )
        .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

//! Integration tests for flag evaluation by project key.

mod common;

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
};
use common::{test_config, TestApp};
use serde_json::json;
use std::time::Duration;

/// App with project "acme", environments prod and staging, flag dark-mode.
async fn acme(app: &TestApp) -> (String, String) {
    let token = app.login_new_user().await;
    let key = app.create_project(&token, "acme").await;
    app.create_environment(&token, "acme", "prod").await;
    app.create_environment(&token, "acme", "staging").await;
    app.create_flag(&token, "acme", "dark-mode").await;
    (token, key)
}

#[tokio::test]
async fn test_new_flag_evaluates_active() {
    let app = TestApp::new();
    let (_, key) = acme(&app).await;

    let (status, body) = app.evaluate(&key, "prod", "dark-mode").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({ "environment": "prod", "flag": "dark-mode", "status": true })
    );
}

#[tokio::test]
async fn test_evaluation_reads_persisted_status() {
    let app = TestApp::new();
    let (token, key) = acme(&app).await;
    app.set_flag_status(&token, "acme", "staging", "dark-mode", false)
        .await;

    let (_, body) = app.evaluate(&key, "staging", "dark-mode").await;
    assert_eq!(body["status"], false);

    let (_, body) = app.evaluate(&key, "prod", "dark-mode").await;
    assert_eq!(body["status"], true);
}

#[tokio::test]
async fn test_repeated_evaluation_hits_cache() {
    let app = TestApp::new();
    let (_, key) = acme(&app).await;

    for _ in 0..3 {
        let (status, _) = app.evaluate(&key, "prod", "dark-mode").await;
        assert_eq!(status, StatusCode::OK);
    }

    assert_eq!(app.store.calls().find_flag_details(), 1);
}

#[tokio::test]
async fn test_status_change_visible_after_ttl() {
    let mut config = test_config();
    config.cache.ttl_secs = 1;
    let app = TestApp::with_config(config);
    let (token, key) = acme(&app).await;

    let (_, body) = app.evaluate(&key, "prod", "dark-mode").await;
    assert_eq!(body["status"], true);

    app.set_flag_status(&token, "acme", "prod", "dark-mode", false)
        .await;

    // Served from cache until the entry expires.
    let (_, body) = app.evaluate(&key, "prod", "dark-mode").await;
    assert_eq!(body["status"], true);

    tokio::time::sleep(Duration::from_millis(1_500)).await;

    let (_, body) = app.evaluate(&key, "prod", "dark-mode").await;
    assert_eq!(body["status"], false);
}

#[tokio::test]
async fn test_unknown_names_are_not_found() {
    let app = TestApp::new();
    let (_, key) = acme(&app).await;
    let other_key = shared::crypto::generate_project_key();

    for (key, environment, flag) in [
        (key.as_str(), "qa", "dark-mode"),
        (key.as_str(), "prod", "missing"),
        (other_key.as_str(), "prod", "dark-mode"),
    ] {
        let (status, body) = app.evaluate(key, environment, flag).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "not_found");
    }
}

#[tokio::test]
async fn test_missing_project_key_header() {
    let app = TestApp::new();

    let request = Request::builder()
        .method(Method::GET)
        .uri("/api/v1/flags/prod/dark-mode")
        .body(Body::empty())
        .unwrap();
    let (status, body) = app.send(request).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "unauthorized");
}

#[tokio::test]
async fn test_malformed_project_key() {
    let app = TestApp::new();

    let (status, _) = app.evaluate("short", "prod", "dark-mode").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_bearer_token_is_not_a_project_key() {
    let app = TestApp::new();
    let (token, _) = acme(&app).await;

    let (status, _) = app.get("/api/v1/flags/prod/dark-mode", Some(&token)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_duplicate_setting_is_internal_error() {
    let app = TestApp::new();
    let (_, key) = acme(&app).await;

    let details = {
        use domain::store::FeatureStore;
        app.store
            .find_flag_details(&key, "prod", "dark-mode")
            .await
            .unwrap()
    };
    app.store.insert_duplicate_setting(&details[0].setting).await;

    let (status, body) = app.evaluate(&key, "prod", "dark-mode").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "internal_error");
}

#[tokio::test]
async fn test_store_outage_is_service_unavailable() {
    let app = TestApp::new();
    let (_, key) = acme(&app).await;
    app.store.fail_flag_details(true);

    let (status, body) = app.evaluate(&key, "prod", "dark-mode").await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["error"], "service_unavailable");
}

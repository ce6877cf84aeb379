//! Common test utilities for HTTP integration tests.
//!
//! The app is built over the in-memory store, so these tests need no database.

// Not every test binary uses every helper.
#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use domain::store::InMemoryStore;
use fake::faker::internet::en::SafeEmail;
use fake::Fake;
use flagger_api::config::{
    CacheConfig, Config, DatabaseConfig, JwtAuthConfig, LoggingConfig, ProvisioningConfig,
    ServerConfig, StoreBackend, StoreConfig,
};
use flagger_api::{create_app, AppState};
use serde_json::{json, Value};
use shared::jwt::JwtConfig;
use std::sync::Arc;
use tower::ServiceExt;

pub const JWT_SECRET: &str = "integration-test-secret";

/// Test configuration using the in-memory backend.
pub fn test_config() -> Config {
    Config {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            request_timeout_secs: 30,
            max_body_size: 65_536,
            cors_origins: vec![],
        },
        database: DatabaseConfig {
            url: String::new(),
            max_connections: 5,
            min_connections: 1,
            connect_timeout_secs: 10,
            idle_timeout_secs: 600,
        },
        logging: LoggingConfig {
            level: "debug".to_string(),
            format: "pretty".to_string(),
        },
        cache: CacheConfig {
            ttl_secs: 60,
            max_capacity: 1_000,
        },
        provisioning: ProvisioningConfig {
            key_allocation_attempts: 5,
        },
        store: StoreConfig {
            backend: StoreBackend::Memory,
        },
        jwt: JwtAuthConfig {
            private_key: "unused".to_string(),
            public_key: "unused".to_string(),
            access_token_expiry_secs: 3600,
            leeway_secs: 0,
        },
    }
}

/// Router plus a handle on its backing store.
pub struct TestApp {
    pub router: Router,
    pub store: InMemoryStore,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_config(test_config())
    }

    pub fn with_config(config: Config) -> Self {
        let store = InMemoryStore::new();
        let jwt = JwtConfig::from_secret(JWT_SECRET, config.jwt.access_token_expiry_secs);
        let state = AppState::new(
            config,
            Arc::new(store.clone()),
            Arc::new(store.clone()),
            jwt,
        );

        Self {
            router: create_app(state),
            store,
        }
    }

    /// Sends a request and returns the status and JSON body (`Null` if the
    /// body is empty or not JSON).
    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&body).unwrap_or(Value::Null))
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.send(json_request(Method::POST, uri, token, body)).await
    }

    pub async fn put(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.send(json_request(Method::PUT, uri, token, body)).await
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(Method::GET).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        self.send(builder.body(Body::empty()).unwrap()).await
    }

    /// Evaluates a flag with the given project key.
    pub async fn evaluate(&self, project_key: &str, environment: &str, flag: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(Method::GET)
            .uri(format!("/api/v1/flags/{}/{}", environment, flag))
            .header("X-Project-Key", project_key)
            .body(Body::empty())
            .unwrap();
        self.send(request).await
    }

    /// Registers a fresh user and returns a bearer token for them.
    pub async fn login_new_user(&self) -> String {
        let user = TestUser::new();
        let (status, body) = self.post("/api/v1/auth/register", None, user.register_body()).await;
        assert_eq!(status, StatusCode::CREATED, "register failed: {}", body);

        let (status, body) = self.post("/api/v1/auth/login", None, user.login_body()).await;
        assert_eq!(status, StatusCode::OK, "login failed: {}", body);
        body["access_token"].as_str().unwrap().to_string()
    }

    /// Creates a project and returns its key.
    pub async fn create_project(&self, token: &str, name: &str) -> String {
        let (status, body) = self
            .post("/api/v1/projects", Some(token), json!({ "name": name }))
            .await;
        assert_eq!(status, StatusCode::CREATED, "create project failed: {}", body);

        let (status, body) = self
            .get(&format!("/api/v1/projects/{}/key", name), Some(token))
            .await;
        assert_eq!(status, StatusCode::OK);
        body["project_key"].as_str().unwrap().to_string()
    }

    pub async fn create_environment(&self, token: &str, project: &str, name: &str) -> (StatusCode, Value) {
        self.post(
            &format!("/api/v1/projects/{}/environments", project),
            Some(token),
            json!({ "name": name }),
        )
        .await
    }

    pub async fn create_flag(&self, token: &str, project: &str, name: &str) -> (StatusCode, Value) {
        self.post(
            &format!("/api/v1/projects/{}/flags", project),
            Some(token),
            json!({ "name": name }),
        )
        .await
    }

    pub async fn set_flag_status(
        &self,
        token: &str,
        project: &str,
        environment: &str,
        flag: &str,
        is_active: bool,
    ) -> (StatusCode, Value) {
        self.put(
            &format!(
                "/api/v1/projects/{}/environments/{}/flags/{}",
                project, environment, flag
            ),
            Some(token),
            json!({ "is_active": is_active }),
        )
        .await
    }
}

pub fn json_request(method: Method, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap()
}

/// Test account data.
pub struct TestUser {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl TestUser {
    pub fn new() -> Self {
        Self {
            username: format!("user_{}", &uuid::Uuid::new_v4().simple().to_string()[..12]),
            email: SafeEmail().fake(),
            password: "SecureP@ss123!".to_string(),
        }
    }

    pub fn register_body(&self) -> Value {
        json!({
            "username": self.username,
            "name": "Test User",
            "email": self.email,
            "password": self.password,
        })
    }

    pub fn login_body(&self) -> Value {
        json!({
            "username": self.username,
            "password": self.password,
        })
    }
}

impl Default for TestUser {
    fn default() -> Self {
        Self::new()
    }
}

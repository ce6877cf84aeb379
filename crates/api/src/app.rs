use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post, put},
    Router,
};
use domain::services::{
    EvaluationResolver, InProcessFlagStatusCache, KeyAllocator, ProvisioningCoordinator,
};
use domain::store::{FeatureStore, UserStore};
use shared::jwt::JwtConfig;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowOrigin, Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::Config;
use crate::middleware::{
    metrics_handler, metrics_middleware, require_user_auth, trace_id,
};
use crate::routes::{auth, flags, health, projects};
use crate::services::AuthService;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub store: Arc<dyn FeatureStore>,
    pub coordinator: Arc<ProvisioningCoordinator>,
    pub resolver: Arc<EvaluationResolver>,
    pub auth: Arc<AuthService>,
    pub jwt: Arc<JwtConfig>,
}

impl AppState {
    /// Wires the domain services over the given stores.
    pub fn new(
        config: Config,
        store: Arc<dyn FeatureStore>,
        users: Arc<dyn UserStore>,
        jwt: JwtConfig,
    ) -> Self {
        let jwt = Arc::new(jwt);
        let allocator = KeyAllocator::new(config.provisioning.key_allocation_attempts);
        let cache = Arc::new(InProcessFlagStatusCache::new(config.cache.max_capacity));

        Self {
            coordinator: Arc::new(ProvisioningCoordinator::new(store.clone(), allocator)),
            resolver: Arc::new(EvaluationResolver::new(
                store.clone(),
                cache,
                config.cache.ttl(),
            )),
            auth: Arc::new(AuthService::new(users, jwt.clone())),
            config: Arc::new(config),
            store,
            jwt,
        }
    }
}

pub fn create_app(state: AppState) -> Router {
    let config = state.config.clone();

    let cors = if config.server.cors_origins.is_empty() {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<_> = config
            .server
            .cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any)
    };

    let public_routes = Router::new()
        .route("/api/health", get(health::health_check))
        .route("/api/health/live", get(health::live))
        .route("/api/health/ready", get(health::ready))
        .route("/metrics", get(metrics_handler))
        .route("/api/v1/auth/register", post(auth::register))
        .route("/api/v1/auth/login", post(auth::login));

    // Evaluation authenticates with the project key header instead of a token.
    let evaluation_routes =
        Router::new().route("/api/v1/flags/:environment/:flag", get(flags::get_flag_status));

    let user_routes = Router::new()
        .route("/api/v1/auth/change-password", post(auth::change_password))
        .route("/api/v1/projects", post(projects::create_project))
        .route("/api/v1/projects/:project/key", get(projects::get_project_key))
        .route(
            "/api/v1/projects/:project/settings",
            get(projects::list_flag_settings),
        )
        .route(
            "/api/v1/projects/:project/environments",
            post(projects::create_environment),
        )
        .route("/api/v1/projects/:project/flags", post(projects::create_flag))
        .route(
            "/api/v1/projects/:project/environments/:environment/flags/:flag",
            put(projects::update_flag_status),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_user_auth,
        ));

    Router::new()
        .merge(public_routes)
        .merge(evaluation_routes)
        .merge(user_routes)
        // Global middleware (bottom layers run first)
        .layer(DefaultBodyLimit::max(config.server.max_body_size))
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(trace_id))
        .layer(cors)
        .with_state(state)
}

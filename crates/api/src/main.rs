use anyhow::{Context, Result};
use domain::store::InMemoryStore;
use flagger_api::config::{Config, StoreBackend};
use flagger_api::middleware::{init_logging, init_metrics};
use flagger_api::{create_app, AppState};
use persistence::PgFeatureStore;
use shared::jwt::JwtConfig;
use std::sync::Arc;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let config = Config::load()?;

    init_logging(&config.logging).context("Failed to initialize logging")?;
    init_metrics().context("Failed to install Prometheus recorder")?;

    info!("Starting Flagger API v{}", env!("CARGO_PKG_VERSION"));

    let jwt = JwtConfig::from_rsa_pem(
        &config.jwt.private_key_pem(),
        &config.jwt.public_key_pem(),
        config.jwt.access_token_expiry_secs,
        config.jwt.leeway_secs,
    )
    .context("Failed to initialize JWT keys")?;

    let state = match config.store.backend {
        StoreBackend::Postgres => {
            let db_config = persistence::db::DatabaseConfig::from(&config.database);
            let pool = persistence::db::create_pool(&db_config).await?;

            info!("Running database migrations...");
            persistence::db::run_migrations(&pool).await?;
            info!("Migrations completed");

            let store = Arc::new(PgFeatureStore::new(pool));
            AppState::new(config.clone(), store.clone(), store, jwt)
        }
        StoreBackend::Memory => {
            warn!("Using the in-memory store; all data is lost on shutdown");
            let store = Arc::new(InMemoryStore::new());
            AppState::new(config.clone(), store.clone(), store, jwt)
        }
    };

    let app = create_app(state);

    let addr = config.socket_addr()?;
    info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

//! HTTP surface of the Flagger feature flag service.

pub mod app;
pub mod config;
pub mod error;
pub mod extractors;
pub mod middleware;
pub mod routes;
pub mod services;

pub use app::{create_app, AppState};
pub use config::Config;

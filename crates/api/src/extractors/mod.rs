//! Custom Axum extractors.

pub mod project_key;
pub mod user_auth;

pub use project_key::{ProjectKey, PROJECT_KEY_HEADER};
pub use user_auth::UserAuth;

//! HTTP route handlers.

pub mod auth;
pub mod flags;
pub mod health;
pub mod projects;

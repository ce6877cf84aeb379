//! Application services that sit between routes and the domain crate.

pub mod auth;

pub use auth::{AuthError, AuthService};

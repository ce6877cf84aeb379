//! Domain layer for the Flagger backend.
//!
//! This crate contains:
//! - Domain models (Project, Environment, Flag, FlagSetting, User)
//! - The error taxonomy shared by every core operation
//! - Store traits that persistence adapters implement, plus an in-memory store
//! - Core services: provisioning, project key allocation, flag evaluation and
//!   the evaluation cache

pub mod error;
pub mod models;
pub mod services;
pub mod store;

pub use error::{CoreError, EntityKind, InvariantViolation, StoreError};

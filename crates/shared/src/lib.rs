//! Shared utilities for the Flagger backend.
//!
//! This crate provides common functionality used across all other crates:
//! - Project key generation
//! - JWT access token issuance and validation
//! - Password hashing with Argon2id
//! - Name validation for projects, environments and flags

pub mod crypto;
pub mod jwt;
pub mod password;
pub mod validation;

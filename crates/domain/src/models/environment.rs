//! Environment domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// A named deployment context (e.g. "prod") within a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Environment {
    pub id: Uuid,
    pub name: String,
    pub project_id: Uuid,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Values needed to insert an environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEnvironment {
    pub name: String,
    pub project_id: Uuid,
    pub created_by: Uuid,
}

/// Request payload for creating an environment.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct CreateEnvironmentRequest {
    #[validate(custom(function = "shared::validation::validate_resource_name"))]
    pub name: String,
}

/// Response for creating an environment.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct CreateEnvironmentResponse {
    pub id: Uuid,
    pub name: String,
    pub flag_settings_created: usize,
}

//! Project domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Top-level namespace owning environments, flags and flag settings.
///
/// The reference lists keep insertion order. They are only ever appended to,
/// by the provisioning coordinator, inside the same transaction that creates
/// the referenced records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Project {
    pub id: Uuid,
    pub key: String,
    pub name: String,
    pub environment_ids: Vec<Uuid>,
    pub flag_ids: Vec<Uuid>,
    pub flag_setting_ids: Vec<Uuid>,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Project {
    /// Returns true if at least one environment exists.
    pub fn has_environments(&self) -> bool {
        !self.environment_ids.is_empty()
    }

    /// Number of flag settings required for full environment × flag coverage.
    pub fn expected_setting_count(&self) -> usize {
        self.environment_ids.len() * self.flag_ids.len()
    }
}

/// Values needed to insert a project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProject {
    pub key: String,
    pub name: String,
    pub created_by: Uuid,
}

/// Request payload for creating a project.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct CreateProjectRequest {
    #[validate(custom(function = "shared::validation::validate_resource_name"))]
    pub name: String,
}

/// Response for creating a project.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct CreateProjectResponse {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// Response carrying a project's key.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct ProjectKeyResponse {
    pub project_key: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn project(envs: usize, flags: usize) -> Project {
        Project {
            id: Uuid::new_v4(),
            key: "k".repeat(32),
            name: "acme".to_string(),
            environment_ids: (0..envs).map(|_| Uuid::new_v4()).collect(),
            flag_ids: (0..flags).map(|_| Uuid::new_v4()).collect(),
            flag_setting_ids: vec![],
            created_by: Uuid::new_v4(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_has_environments() {
        assert!(!project(0, 0).has_environments());
        assert!(project(1, 0).has_environments());
    }

    #[test]
    fn test_expected_setting_count() {
        assert_eq!(project(2, 2).expected_setting_count(), 4);
        assert_eq!(project(3, 0).expected_setting_count(), 0);
    }

    #[test]
    fn test_create_project_request_validation() {
        let ok = CreateProjectRequest {
            name: "acme".to_string(),
        };
        assert!(ok.validate().is_ok());

        let bad = CreateProjectRequest {
            name: "acme corp".to_string(),
        };
        assert!(bad.validate().is_err());

        let empty = CreateProjectRequest {
            name: String::new(),
        };
        assert!(empty.validate().is_err());
    }
}

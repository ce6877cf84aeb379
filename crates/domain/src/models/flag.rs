//! Flag domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// A named boolean feature switch within a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Flag {
    pub id: Uuid,
    pub name: String,
    pub project_id: Uuid,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Values needed to insert a flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewFlag {
    pub name: String,
    pub project_id: Uuid,
    pub created_by: Uuid,
}

/// Request payload for creating a flag.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct CreateFlagRequest {
    #[validate(custom(function = "shared::validation::validate_resource_name"))]
    pub name: String,
}

/// Response for creating a flag.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct CreateFlagResponse {
    pub id: Uuid,
    pub name: String,
    pub flag_settings_created: usize,
}

/// Request payload for toggling a flag in one environment.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct UpdateFlagStatusRequest {
    pub is_active: bool,
}

/// Response for a flag status query.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct FlagStatusResponse {
    pub environment: String,
    pub flag: String,
    pub status: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_flag_request_validation() {
        let ok = CreateFlagRequest {
            name: "new-checkout".to_string(),
        };
        assert!(ok.validate().is_ok());

        let bad = CreateFlagRequest {
            name: "status:key".to_string(),
        };
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_update_flag_status_request_deserialize() {
        let req: UpdateFlagStatusRequest =
            serde_json::from_str(r#"{"is_active": false}"#).unwrap();
        assert!(!req.is_active);
    }

    #[test]
    fn test_update_flag_status_request_requires_field() {
        let result: Result<UpdateFlagStatusRequest, _> = serde_json::from_str("{}");
        assert!(result.is_err());
    }
}

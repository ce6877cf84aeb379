//! Flag setting domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Activation state of one flag in one environment.
///
/// Exactly one record exists per (project, environment, flag) triple once both
/// the environment and the flag exist. Only `is_active` ever changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct FlagSetting {
    pub id: Uuid,
    pub project_id: Uuid,
    pub environment_id: Uuid,
    pub flag_id: Uuid,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Values needed to insert a flag setting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewFlagSetting {
    pub project_id: Uuid,
    pub environment_id: Uuid,
    pub flag_id: Uuid,
    pub is_active: bool,
}

impl NewFlagSetting {
    /// New settings start active.
    pub fn active(project_id: Uuid, environment_id: Uuid, flag_id: Uuid) -> Self {
        Self {
            project_id,
            environment_id,
            flag_id,
            is_active: true,
        }
    }
}

/// One row of the evaluation join: a flag setting resolved from a project
/// key, an environment name and a flag name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlagDetails {
    pub project_id: Uuid,
    pub project_key: String,
    pub environment_id: Uuid,
    pub environment_name: String,
    pub flag_id: Uuid,
    pub flag_name: String,
    pub setting: FlagSetting,
}

/// A flag setting labelled with environment and flag names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct FlagSettingView {
    pub environment: String,
    pub flag: String,
    pub is_active: bool,
    pub updated_at: DateTime<Utc>,
}

/// Response for listing a project's flag settings.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct ListFlagSettingsResponse {
    pub data: Vec<FlagSettingView>,
    pub count: usize,
}

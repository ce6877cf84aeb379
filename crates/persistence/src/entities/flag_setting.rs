//! Flag setting entities (database row mappings).

use chrono::{DateTime, Utc};
use domain::models::{FlagDetails, FlagSetting, FlagSettingView};
use sqlx::FromRow;
use uuid::Uuid;

/// Database row mapping for the flag_settings table.
#[derive(Debug, Clone, FromRow)]
pub struct FlagSettingEntity {
    pub id: Uuid,
    pub project_id: Uuid,
    pub environment_id: Uuid,
    pub flag_id: Uuid,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<FlagSettingEntity> for FlagSetting {
    fn from(entity: FlagSettingEntity) -> Self {
        Self {
            id: entity.id,
            project_id: entity.project_id,
            environment_id: entity.environment_id,
            flag_id: entity.flag_id,
            is_active: entity.is_active,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}

/// One row of the evaluation join.
#[derive(Debug, Clone, FromRow)]
pub struct FlagDetailsEntity {
    pub project_id: Uuid,
    pub project_key: String,
    pub environment_id: Uuid,
    pub environment_name: String,
    pub flag_id: Uuid,
    pub flag_name: String,
    pub setting_id: Uuid,
    pub is_active: bool,
    pub setting_created_at: DateTime<Utc>,
    pub setting_updated_at: DateTime<Utc>,
}

impl From<FlagDetailsEntity> for FlagDetails {
    fn from(entity: FlagDetailsEntity) -> Self {
        Self {
            setting: FlagSetting {
                id: entity.setting_id,
                project_id: entity.project_id,
                environment_id: entity.environment_id,
                flag_id: entity.flag_id,
                is_active: entity.is_active,
                created_at: entity.setting_created_at,
                updated_at: entity.setting_updated_at,
            },
            project_id: entity.project_id,
            project_key: entity.project_key,
            environment_id: entity.environment_id,
            environment_name: entity.environment_name,
            flag_id: entity.flag_id,
            flag_name: entity.flag_name,
        }
    }
}

/// A flag setting labelled with environment and flag names.
#[derive(Debug, Clone, FromRow)]
pub struct FlagSettingViewEntity {
    pub environment: String,
    pub flag: String,
    pub is_active: bool,
    pub updated_at: DateTime<Utc>,
}

impl From<FlagSettingViewEntity> for FlagSettingView {
    fn from(entity: FlagSettingViewEntity) -> Self {
        Self {
            environment: entity.environment,
            flag: entity.flag,
            is_active: entity.is_active,
            updated_at: entity.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_details_entity_to_domain() {
        let now = Utc::now();
        let entity = FlagDetailsEntity {
            project_id: Uuid::new_v4(),
            project_key: "key".to_string(),
            environment_id: Uuid::new_v4(),
            environment_name: "prod".to_string(),
            flag_id: Uuid::new_v4(),
            flag_name: "dark-mode".to_string(),
            setting_id: Uuid::new_v4(),
            is_active: false,
            setting_created_at: now,
            setting_updated_at: now,
        };

        let details: FlagDetails = entity.clone().into();
        assert_eq!(details.setting.id, entity.setting_id);
        assert_eq!(details.setting.project_id, entity.project_id);
        assert_eq!(details.setting.environment_id, entity.environment_id);
        assert_eq!(details.setting.flag_id, entity.flag_id);
        assert!(!details.setting.is_active);
        assert_eq!(details.environment_name, "prod");
    }
}

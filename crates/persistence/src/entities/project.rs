//! Project entity (database row mapping).

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Database row mapping for the projects table.
#[derive(Debug, Clone, FromRow)]
pub struct ProjectEntity {
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

impl From<ProjectEntity> for domain::models::Project {
    fn from(entity: ProjectEntity) -> Self {
        Self {
            id: entity.id,
            key: entity.key,
            name: entity.name,
            environment_ids: entity.environment_ids,
            flag_ids: entity.flag_ids,
            flag_setting_ids: entity.flag_setting_ids,
            created_by: entity.created_by,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_to_domain_keeps_list_order() {
        let envs = vec![Uuid::new_v4(), Uuid::new_v4()];
        let entity = ProjectEntity {
            id: Uuid::new_v4(),
            key: "k".repeat(32),
            name: "acme".to_string(),
            environment_ids: envs.clone(),
            flag_ids: vec![],
            flag_setting_ids: vec![],
            created_by: Uuid::new_v4(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let project: domain::models::Project = entity.into();
        assert_eq!(project.environment_ids, envs);
        assert!(project.flag_ids.is_empty());
    }
}

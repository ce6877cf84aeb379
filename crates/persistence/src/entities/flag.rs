//! Flag entity (database row mapping).

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Database row mapping for the flags table.
#[derive(Debug, Clone, FromRow)]
pub struct FlagEntity {
    pub id: Uuid,
    pub name: String,
    pub project_id: Uuid,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
}

impl From<FlagEntity> for domain::models::Flag {
    fn from(entity: FlagEntity) -> Self {
        Self {
            id: entity.id,
            name: entity.name,
            project_id: entity.project_id,
            created_by: entity.created_by,
            created_at: entity.created_at,
        }
    }
}

//! Flag repository for database operations.

use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::entities::FlagEntity;
use crate::metrics::QueryTimer;

/// Repository for flag-related database operations.
#[derive(Clone)]
pub struct FlagRepository {
    pool: PgPool,
}

impl FlagRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_name(
        &self,
        project_id: Uuid,
        name: &str,
    ) -> Result<Option<FlagEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_flag_by_name");
        let result = sqlx::query_as::<_, FlagEntity>(
            r#"
            SELECT id, name, project_id, created_by, created_at
            FROM flags
            WHERE project_id = $1 AND name = $2
            "#,
        )
        .bind(project_id)
        .bind(name)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    pub async fn create(
        conn: &mut PgConnection,
        name: &str,
        project_id: Uuid,
        created_by: Uuid,
    ) -> Result<FlagEntity, sqlx::Error> {
        let timer = QueryTimer::new("create_flag");
        let result = sqlx::query_as::<_, FlagEntity>(
            r#"
            INSERT INTO flags (name, project_id, created_by)
            VALUES ($1, $2, $3)
            RETURNING id, name, project_id, created_by, created_at
            "#,
        )
        .bind(name)
        .bind(project_id)
        .bind(created_by)
        .fetch_one(conn)
        .await;
        timer.record();
        result
    }
}

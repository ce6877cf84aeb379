//! Project repository for database operations.

use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::entities::ProjectEntity;
use crate::metrics::QueryTimer;

const PROJECT_COLUMNS: &str = "id, key, name, environment_ids, flag_ids, flag_setting_ids, \
                               created_by, created_at, updated_at";

/// Repository for project-related database operations.
#[derive(Clone)]
pub struct ProjectRepository {
    pool: PgPool,
}

impl ProjectRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a project with empty reference lists.
    pub async fn create(
        &self,
        key: &str,
        name: &str,
        created_by: Uuid,
    ) -> Result<ProjectEntity, sqlx::Error> {
        let timer = QueryTimer::new("create_project");
        let result = sqlx::query_as::<_, ProjectEntity>(&format!(
            r#"
            INSERT INTO projects (key, name, created_by)
            VALUES ($1, $2, $3)
            RETURNING {PROJECT_COLUMNS}
            "#
        ))
        .bind(key)
        .bind(name)
        .bind(created_by)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Find a project by name among the projects of one creator.
    pub async fn find_by_owner_and_name(
        &self,
        created_by: Uuid,
        name: &str,
    ) -> Result<Option<ProjectEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_project_by_name");
        let result = sqlx::query_as::<_, ProjectEntity>(&format!(
            r#"
            SELECT {PROJECT_COLUMNS}
            FROM projects
            WHERE created_by = $1 AND name = $2
            "#
        ))
        .bind(created_by)
        .bind(name)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Re-read a project and hold a row lock on it until the transaction ends.
    pub async fn lock(
        conn: &mut PgConnection,
        id: Uuid,
    ) -> Result<Option<ProjectEntity>, sqlx::Error> {
        let timer = QueryTimer::new("lock_project");
        let result = sqlx::query_as::<_, ProjectEntity>(&format!(
            r#"
            SELECT {PROJECT_COLUMNS}
            FROM projects
            WHERE id = $1
            FOR UPDATE
            "#
        ))
        .bind(id)
        .fetch_optional(conn)
        .await;
        timer.record();
        result
    }

    /// Append an environment and its new flag settings to the project lists.
    pub async fn append_environment(
        conn: &mut PgConnection,
        id: Uuid,
        environment_id: Uuid,
        setting_ids: &[Uuid],
    ) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("append_project_environment");
        let result = sqlx::query(
            r#"
            UPDATE projects
            SET environment_ids = array_append(environment_ids, $2),
                flag_setting_ids = array_cat(flag_setting_ids, $3::uuid[]),
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(environment_id)
        .bind(setting_ids)
        .execute(conn)
        .await
        .map(|r| r.rows_affected());
        timer.record();
        result
    }

    /// Append a flag and its new flag settings to the project lists.
    pub async fn append_flag(
        conn: &mut PgConnection,
        id: Uuid,
        flag_id: Uuid,
        setting_ids: &[Uuid],
    ) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("append_project_flag");
        let result = sqlx::query(
            r#"
            UPDATE projects
            SET flag_ids = array_append(flag_ids, $2),
                flag_setting_ids = array_cat(flag_setting_ids, $3::uuid[]),
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(flag_id)
        .bind(setting_ids)
        .execute(conn)
        .await
        .map(|r| r.rows_affected());
        timer.record();
        result
    }
}

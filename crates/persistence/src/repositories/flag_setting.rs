//! Flag setting repository for database operations.

use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::entities::{FlagDetailsEntity, FlagSettingEntity, FlagSettingViewEntity};
use crate::metrics::QueryTimer;

/// Repository for flag setting database operations, including the
/// evaluation join.
#[derive(Clone)]
pub struct FlagSettingRepository {
    pool: PgPool,
}

impl FlagSettingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(
        conn: &mut PgConnection,
        project_id: Uuid,
        environment_id: Uuid,
        flag_id: Uuid,
        is_active: bool,
    ) -> Result<FlagSettingEntity, sqlx::Error> {
        let timer = QueryTimer::new("create_flag_setting");
        let result = sqlx::query_as::<_, FlagSettingEntity>(
            r#"
            INSERT INTO flag_settings (project_id, environment_id, flag_id, is_active)
            VALUES ($1, $2, $3, $4)
            RETURNING id, project_id, environment_id, flag_id, is_active, created_at, updated_at
            "#,
        )
        .bind(project_id)
        .bind(environment_id)
        .bind(flag_id)
        .bind(is_active)
        .fetch_one(conn)
        .await;
        timer.record();
        result
    }

    /// Set `is_active` for one triple. Returns the number of rows matched.
    pub async fn update_status(
        &self,
        project_id: Uuid,
        environment_id: Uuid,
        flag_id: Uuid,
        is_active: bool,
    ) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("update_flag_setting_status");
        let result = sqlx::query(
            r#"
            UPDATE flag_settings
            SET is_active = $4, updated_at = NOW()
            WHERE project_id = $1 AND environment_id = $2 AND flag_id = $3
            "#,
        )
        .bind(project_id)
        .bind(environment_id)
        .bind(flag_id)
        .bind(is_active)
        .execute(&self.pool)
        .await
        .map(|r| r.rows_affected());
        timer.record();
        result
    }

    /// List a project's settings in environment then flag list order.
    pub async fn list_for_project(
        &self,
        project_id: Uuid,
    ) -> Result<Vec<FlagSettingViewEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_flag_settings");
        let result = sqlx::query_as::<_, FlagSettingViewEntity>(
            r#"
            SELECT e.name AS environment, f.name AS flag, fs.is_active, fs.updated_at
            FROM projects p
            CROSS JOIN LATERAL unnest(p.environment_ids) WITH ORDINALITY AS pe(environment_id, env_pos)
            JOIN environments e ON e.id = pe.environment_id
            CROSS JOIN LATERAL unnest(p.flag_ids) WITH ORDINALITY AS pf(flag_id, flag_pos)
            JOIN flags f ON f.id = pf.flag_id
            JOIN flag_settings fs
              ON fs.project_id = p.id AND fs.environment_id = e.id AND fs.flag_id = f.id
            WHERE p.id = $1
            ORDER BY pe.env_pos, pf.flag_pos
            "#,
        )
        .bind(project_id)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Resolve project key, environment name and flag name to flag settings
    /// in one statement, following the project's reference lists.
    pub async fn find_details(
        &self,
        project_key: &str,
        environment_name: &str,
        flag_name: &str,
    ) -> Result<Vec<FlagDetailsEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_flag_details");
        let result = sqlx::query_as::<_, FlagDetailsEntity>(
            r#"
            SELECT
                p.id AS project_id, p.key AS project_key,
                e.id AS environment_id, e.name AS environment_name,
                f.id AS flag_id, f.name AS flag_name,
                fs.id AS setting_id, fs.is_active,
                fs.created_at AS setting_created_at, fs.updated_at AS setting_updated_at
            FROM projects p
            JOIN environments e
              ON e.id = ANY(p.environment_ids) AND e.name = $2
            JOIN flags f
              ON f.id = ANY(p.flag_ids) AND f.name = $3
            JOIN flag_settings fs
              ON fs.id = ANY(p.flag_setting_ids)
             AND fs.project_id = p.id
             AND fs.environment_id = e.id
             AND fs.flag_id = f.id
            WHERE p.key = $1
            "#,
        )
        .bind(project_key)
        .bind(environment_name)
        .bind(flag_name)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }
}

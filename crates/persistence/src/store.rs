//! PostgreSQL implementation of the domain store traits.

use async_trait::async_trait;
use domain::error::StoreError;
use domain::models::{
    Environment, Flag, FlagDetails, FlagSetting, FlagSettingView, NewEnvironment, NewFlag,
    NewFlagSetting, NewProject, NewUser, Project, User,
};
use domain::store::{FeatureStore, ProvisioningTransaction, UserStore};
use sqlx::{PgPool, Postgres, Transaction};
use tracing::debug;
use uuid::Uuid;

use crate::error::map_sqlx_error;
use crate::metrics::record_pool_metrics;
use crate::repositories::{
    EnvironmentRepository, FlagRepository, FlagSettingRepository, ProjectRepository,
    UserRepository,
};

/// Store backed by a PostgreSQL pool.
#[derive(Clone)]
pub struct PgFeatureStore {
    pool: PgPool,
    projects: ProjectRepository,
    environments: EnvironmentRepository,
    flags: FlagRepository,
    flag_settings: FlagSettingRepository,
    users: UserRepository,
}

impl PgFeatureStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            projects: ProjectRepository::new(pool.clone()),
            environments: EnvironmentRepository::new(pool.clone()),
            flags: FlagRepository::new(pool.clone()),
            flag_settings: FlagSettingRepository::new(pool.clone()),
            users: UserRepository::new(pool.clone()),
            pool,
        }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl FeatureStore for PgFeatureStore {
    async fn ping(&self) -> Result<(), StoreError> {
        record_pool_metrics(&self.pool);
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map(|_| ())
            .map_err(map_sqlx_error)
    }

    async fn insert_project(&self, project: NewProject) -> Result<Project, StoreError> {
        self.projects
            .create(&project.key, &project.name, project.created_by)
            .await
            .map(Into::into)
            .map_err(map_sqlx_error)
    }

    async fn find_project_by_name(
        &self,
        owner: Uuid,
        name: &str,
    ) -> Result<Option<Project>, StoreError> {
        self.projects
            .find_by_owner_and_name(owner, name)
            .await
            .map(|p| p.map(Into::into))
            .map_err(map_sqlx_error)
    }

    async fn find_environment_by_name(
        &self,
        project_id: Uuid,
        name: &str,
    ) -> Result<Option<Environment>, StoreError> {
        self.environments
            .find_by_name(project_id, name)
            .await
            .map(|e| e.map(Into::into))
            .map_err(map_sqlx_error)
    }

    async fn find_flag_by_name(
        &self,
        project_id: Uuid,
        name: &str,
    ) -> Result<Option<Flag>, StoreError> {
        self.flags
            .find_by_name(project_id, name)
            .await
            .map(|f| f.map(Into::into))
            .map_err(map_sqlx_error)
    }

    async fn update_flag_setting_status(
        &self,
        project_id: Uuid,
        environment_id: Uuid,
        flag_id: Uuid,
        is_active: bool,
    ) -> Result<u64, StoreError> {
        self.flag_settings
            .update_status(project_id, environment_id, flag_id, is_active)
            .await
            .map_err(map_sqlx_error)
    }

    async fn list_flag_settings(
        &self,
        project_id: Uuid,
    ) -> Result<Vec<FlagSettingView>, StoreError> {
        self.flag_settings
            .list_for_project(project_id)
            .await
            .map(|rows| rows.into_iter().map(Into::into).collect())
            .map_err(map_sqlx_error)
    }

    async fn find_flag_details(
        &self,
        project_key: &str,
        environment_name: &str,
        flag_name: &str,
    ) -> Result<Vec<FlagDetails>, StoreError> {
        self.flag_settings
            .find_details(project_key, environment_name, flag_name)
            .await
            .map(|rows| rows.into_iter().map(Into::into).collect())
            .map_err(map_sqlx_error)
    }

    async fn begin(&self) -> Result<Box<dyn ProvisioningTransaction>, StoreError> {
        let tx = self.pool.begin().await.map_err(map_sqlx_error)?;
        Ok(Box::new(PgProvisioningTransaction { tx }))
    }
}

/// Provisioning transaction over a pooled connection.
///
/// Dropping it without calling `commit` rolls the transaction back.
pub struct PgProvisioningTransaction {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl ProvisioningTransaction for PgProvisioningTransaction {
    async fn lock_project(&mut self, project_id: Uuid) -> Result<Option<Project>, StoreError> {
        ProjectRepository::lock(&mut *self.tx, project_id)
            .await
            .map(|p| p.map(Into::into))
            .map_err(map_sqlx_error)
    }

    async fn insert_environment(
        &mut self,
        environment: NewEnvironment,
    ) -> Result<Environment, StoreError> {
        EnvironmentRepository::create(
            &mut *self.tx,
            &environment.name,
            environment.project_id,
            environment.created_by,
        )
        .await
        .map(Into::into)
        .map_err(map_sqlx_error)
    }

    async fn insert_flag(&mut self, flag: NewFlag) -> Result<Flag, StoreError> {
        FlagRepository::create(&mut *self.tx, &flag.name, flag.project_id, flag.created_by)
            .await
            .map(Into::into)
            .map_err(map_sqlx_error)
    }

    async fn insert_flag_settings(
        &mut self,
        settings: Vec<NewFlagSetting>,
    ) -> Result<Vec<FlagSetting>, StoreError> {
        let mut created = Vec::with_capacity(settings.len());
        for setting in settings {
            let row = FlagSettingRepository::create(
                &mut *self.tx,
                setting.project_id,
                setting.environment_id,
                setting.flag_id,
                setting.is_active,
            )
            .await
            .map_err(map_sqlx_error)?;
            created.push(row.into());
        }
        Ok(created)
    }

    async fn append_environment(
        &mut self,
        project_id: Uuid,
        environment_id: Uuid,
        setting_ids: &[Uuid],
    ) -> Result<(), StoreError> {
        let updated =
            ProjectRepository::append_environment(&mut *self.tx, project_id, environment_id, setting_ids)
                .await
                .map_err(map_sqlx_error)?;
        expect_one_row(updated, project_id)
    }

    async fn append_flag(
        &mut self,
        project_id: Uuid,
        flag_id: Uuid,
        setting_ids: &[Uuid],
    ) -> Result<(), StoreError> {
        let updated = ProjectRepository::append_flag(&mut *self.tx, project_id, flag_id, setting_ids)
            .await
            .map_err(map_sqlx_error)?;
        expect_one_row(updated, project_id)
    }

    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        self.tx.commit().await.map_err(map_sqlx_error)?;
        debug!("Provisioning transaction committed");
        Ok(())
    }
}

fn expect_one_row(updated: u64, project_id: Uuid) -> Result<(), StoreError> {
    if updated == 1 {
        Ok(())
    } else {
        Err(StoreError::Other(format!(
            "project {} was not updated ({} rows)",
            project_id, updated
        )))
    }
}

#[async_trait]
impl UserStore for PgFeatureStore {
    async fn insert_user(&self, user: NewUser) -> Result<User, StoreError> {
        self.users
            .create(
                &user.username,
                &user.display_name,
                &user.email,
                &user.password_hash,
            )
            .await
            .map(Into::into)
            .map_err(map_sqlx_error)
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        self.users
            .find_by_username(username)
            .await
            .map(|u| u.map(Into::into))
            .map_err(map_sqlx_error)
    }

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        self.users
            .find_by_id(id)
            .await
            .map(|u| u.map(Into::into))
            .map_err(map_sqlx_error)
    }

    async fn update_password(&self, id: Uuid, password_hash: &str) -> Result<u64, StoreError> {
        self.users
            .update_password(id, password_hash)
            .await
            .map_err(map_sqlx_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expect_one_row() {
        let id = Uuid::new_v4();
        assert!(expect_one_row(1, id).is_ok());
        assert!(matches!(expect_one_row(0, id), Err(StoreError::Other(_))));
    }
}

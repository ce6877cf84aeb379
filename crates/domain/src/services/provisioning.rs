//! Provisioning coordinator.
//!
//! Every write that grows a project's environment × flag lattice goes through
//! here. Creating an environment or a flag also creates the flag settings
//! needed so that each (environment, flag) pair of the project has exactly
//! one setting, and both happen in one store transaction.
//!
//! The project row is re-read and locked as the first step of each
//! transaction, so the fan-out is computed from the latest committed lists
//! and concurrent provisioning on the same project is serialized.

use std::sync::Arc;
use tracing::{error, info};
use uuid::Uuid;

use crate::error::{CoreError, EntityKind, InvariantViolation};
use crate::models::{
    Environment, Flag, FlagSetting, FlagSettingView, NewEnvironment, NewFlag, NewFlagSetting,
    Project,
};
use crate::services::key_allocator::KeyAllocator;
use crate::store::FeatureStore;

/// An environment together with the settings created for it.
#[derive(Debug, Clone)]
pub struct ProvisionedEnvironment {
    pub environment: Environment,
    pub flag_settings: Vec<FlagSetting>,
}

/// A flag together with the settings created for it.
#[derive(Debug, Clone)]
pub struct ProvisionedFlag {
    pub flag: Flag,
    pub flag_settings: Vec<FlagSetting>,
}

#[derive(Clone)]
pub struct ProvisioningCoordinator {
    store: Arc<dyn FeatureStore>,
    allocator: KeyAllocator,
}

impl ProvisioningCoordinator {
    pub fn new(store: Arc<dyn FeatureStore>, allocator: KeyAllocator) -> Self {
        Self { store, allocator }
    }

    /// Creates a project with empty lists and a freshly allocated key.
    pub async fn create_project(&self, creator_id: Uuid, name: &str) -> Result<Project, CoreError> {
        self.allocator
            .allocate(self.store.as_ref(), creator_id, name)
            .await
    }

    pub async fn find_owned_project(
        &self,
        creator_id: Uuid,
        name: &str,
    ) -> Result<Project, CoreError> {
        self.store
            .find_project_by_name(creator_id, name)
            .await?
            .ok_or(CoreError::NotFound(EntityKind::Project))
    }

    pub async fn get_project_key(
        &self,
        project_name: &str,
        creator_id: Uuid,
    ) -> Result<String, CoreError> {
        Ok(self.find_owned_project(creator_id, project_name).await?.key)
    }

    /// Returns the settings matrix of a project, environment-major.
    pub async fn list_flag_settings(
        &self,
        project_name: &str,
        creator_id: Uuid,
    ) -> Result<Vec<FlagSettingView>, CoreError> {
        let project = self.find_owned_project(creator_id, project_name).await?;
        Ok(self.store.list_flag_settings(project.id).await?)
    }

    /// Creates an environment and one active setting for every existing flag.
    pub async fn create_environment(
        &self,
        project_name: &str,
        environment_name: &str,
        creator_id: Uuid,
    ) -> Result<ProvisionedEnvironment, CoreError> {
        let project = self.find_owned_project(creator_id, project_name).await?;

        let mut tx = self.store.begin().await?;
        let project = tx
            .lock_project(project.id)
            .await?
            .ok_or(CoreError::NotFound(EntityKind::Project))?;

        let environment = tx
            .insert_environment(NewEnvironment {
                name: environment_name.to_string(),
                project_id: project.id,
                created_by: creator_id,
            })
            .await
            .map_err(|e| CoreError::from_store_write(e, EntityKind::Environment, environment_name))?;

        let settings = project
            .flag_ids
            .iter()
            .map(|flag_id| NewFlagSetting::active(project.id, environment.id, *flag_id))
            .collect();
        let flag_settings = tx.insert_flag_settings(settings).await?;
        let setting_ids: Vec<Uuid> = flag_settings.iter().map(|s| s.id).collect();

        tx.append_environment(project.id, environment.id, &setting_ids)
            .await?;
        tx.commit().await?;

        info!(
            project_id = %project.id,
            environment_id = %environment.id,
            flag_settings = flag_settings.len(),
            "Environment created"
        );

        Ok(ProvisionedEnvironment {
            environment,
            flag_settings,
        })
    }

    /// Creates a flag and one active setting for every existing environment.
    ///
    /// Fails with `NoEnvironmentsConfigured` when the project has no
    /// environment yet; no flag is written in that case.
    pub async fn create_flag(
        &self,
        project_name: &str,
        flag_name: &str,
        creator_id: Uuid,
    ) -> Result<ProvisionedFlag, CoreError> {
        let project = self.find_owned_project(creator_id, project_name).await?;
        if !project.has_environments() {
            return Err(CoreError::NoEnvironmentsConfigured);
        }

        let mut tx = self.store.begin().await?;
        let project = tx
            .lock_project(project.id)
            .await?
            .ok_or(CoreError::NotFound(EntityKind::Project))?;

        let flag = tx
            .insert_flag(NewFlag {
                name: flag_name.to_string(),
                project_id: project.id,
                created_by: creator_id,
            })
            .await
            .map_err(|e| CoreError::from_store_write(e, EntityKind::Flag, flag_name))?;

        let settings = project
            .environment_ids
            .iter()
            .map(|environment_id| NewFlagSetting::active(project.id, *environment_id, flag.id))
            .collect();
        let flag_settings = tx.insert_flag_settings(settings).await?;
        let setting_ids: Vec<Uuid> = flag_settings.iter().map(|s| s.id).collect();

        tx.append_flag(project.id, flag.id, &setting_ids).await?;
        tx.commit().await?;

        info!(
            project_id = %project.id,
            flag_id = %flag.id,
            flag_settings = flag_settings.len(),
            "Flag created"
        );

        Ok(ProvisionedFlag {
            flag,
            flag_settings,
        })
    }

    /// Sets a flag's activation state in one environment.
    ///
    /// Cached evaluations of the same triple keep their old value until their
    /// TTL elapses.
    pub async fn update_flag_status(
        &self,
        project_name: &str,
        environment_name: &str,
        flag_name: &str,
        is_active: bool,
        creator_id: Uuid,
    ) -> Result<(), CoreError> {
        let project = self.find_owned_project(creator_id, project_name).await?;
        let environment = self
            .store
            .find_environment_by_name(project.id, environment_name)
            .await?
            .ok_or(CoreError::NotFound(EntityKind::Environment))?;
        let flag = self
            .store
            .find_flag_by_name(project.id, flag_name)
            .await?
            .ok_or(CoreError::NotFound(EntityKind::Flag))?;

        let matched = self
            .store
            .update_flag_setting_status(project.id, environment.id, flag.id, is_active)
            .await?;

        if matched == 0 {
            error!(
                project_id = %project.id,
                environment_id = %environment.id,
                flag_id = %flag.id,
                "No flag setting exists for an existing environment and flag"
            );
            return Err(InvariantViolation::NoMatch.into());
        }

        info!(
            project_id = %project.id,
            environment_id = %environment.id,
            flag_id = %flag.id,
            is_active = is_active,
            "Flag status updated"
        );
        Ok(())
    }
}

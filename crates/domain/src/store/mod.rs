//! Store traits implemented by persistence adapters.
//!
//! The core services only talk to storage through these traits. The
//! PostgreSQL implementation lives in the `persistence` crate;
//! [`memory::InMemoryStore`] is a complete in-process implementation used by
//! tests and by the `memory` backend.
//!
//! Multi-record writes go through a [`ProvisioningTransaction`]. An
//! implementation must guarantee that nothing written through a transaction
//! is visible to any other reader until [`ProvisioningTransaction::commit`]
//! returns `Ok`, and that dropping an uncommitted transaction discards every
//! write made through it.

pub mod memory;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::StoreError;
use crate::models::{
    Environment, Flag, FlagDetails, FlagSetting, FlagSettingView, NewEnvironment, NewFlag,
    NewFlagSetting, NewProject, NewUser, Project, User,
};

pub use memory::InMemoryStore;

/// Access to projects, environments, flags and flag settings.
#[async_trait]
pub trait FeatureStore: Send + Sync {
    /// Checks that the store is reachable.
    async fn ping(&self) -> Result<(), StoreError>;

    /// Inserts a project with empty reference lists.
    ///
    /// Fails with `Duplicate(ProjectKey)` or `Duplicate(ProjectName)`.
    async fn insert_project(&self, project: NewProject) -> Result<Project, StoreError>;

    /// Finds a project by name among the projects created by `owner`.
    async fn find_project_by_name(
        &self,
        owner: Uuid,
        name: &str,
    ) -> Result<Option<Project>, StoreError>;

    /// Finds an environment by name within a project.
    async fn find_environment_by_name(
        &self,
        project_id: Uuid,
        name: &str,
    ) -> Result<Option<Environment>, StoreError>;

    /// Finds a flag by name within a project.
    async fn find_flag_by_name(
        &self,
        project_id: Uuid,
        name: &str,
    ) -> Result<Option<Flag>, StoreError>;

    /// Sets `is_active` on the flag setting identified by the triple and bumps
    /// its `updated_at`. Returns the number of records matched.
    async fn update_flag_setting_status(
        &self,
        project_id: Uuid,
        environment_id: Uuid,
        flag_id: Uuid,
        is_active: bool,
    ) -> Result<u64, StoreError>;

    /// Lists a project's flag settings with environment and flag names,
    /// ordered by environment then flag creation order.
    async fn list_flag_settings(&self, project_id: Uuid)
        -> Result<Vec<FlagSettingView>, StoreError>;

    /// Resolves project key → environment name → flag name → flag setting in
    /// a single query. Returns every matching row so callers can check
    /// cardinality.
    async fn find_flag_details(
        &self,
        project_key: &str,
        environment_name: &str,
        flag_name: &str,
    ) -> Result<Vec<FlagDetails>, StoreError>;

    /// Opens a provisioning transaction.
    async fn begin(&self) -> Result<Box<dyn ProvisioningTransaction>, StoreError>;
}

/// A scoped atomic unit of work over the four entity collections.
#[async_trait]
pub trait ProvisioningTransaction: Send {
    /// Re-reads a project inside the transaction and locks it against
    /// concurrent provisioning until commit or rollback.
    async fn lock_project(&mut self, project_id: Uuid) -> Result<Option<Project>, StoreError>;

    /// Fails with `Duplicate(EnvironmentName)` on a name clash.
    async fn insert_environment(
        &mut self,
        environment: NewEnvironment,
    ) -> Result<Environment, StoreError>;

    /// Fails with `Duplicate(FlagName)` on a name clash.
    async fn insert_flag(&mut self, flag: NewFlag) -> Result<Flag, StoreError>;

    /// Inserts settings in order and returns them in the same order. An empty
    /// input is a no-op.
    async fn insert_flag_settings(
        &mut self,
        settings: Vec<NewFlagSetting>,
    ) -> Result<Vec<FlagSetting>, StoreError>;

    /// Appends an environment id and its new setting ids to the project and
    /// bumps `updated_at`.
    async fn append_environment(
        &mut self,
        project_id: Uuid,
        environment_id: Uuid,
        setting_ids: &[Uuid],
    ) -> Result<(), StoreError>;

    /// Appends a flag id and its new setting ids to the project and bumps
    /// `updated_at`.
    async fn append_flag(
        &mut self,
        project_id: Uuid,
        flag_id: Uuid,
        setting_ids: &[Uuid],
    ) -> Result<(), StoreError>;

    /// Publishes every write made through this transaction.
    async fn commit(self: Box<Self>) -> Result<(), StoreError>;
}

/// Access to user accounts.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Fails with `Duplicate(Username)` if the username is taken.
    async fn insert_user(&self, user: NewUser) -> Result<User, StoreError>;

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, StoreError>;

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError>;

    /// Returns the number of records updated.
    async fn update_password(&self, id: Uuid, password_hash: &str) -> Result<u64, StoreError>;
}

//! In-memory store implementation.
//!
//! Transactions take the store lock for their whole lifetime and work on a
//! staged copy of the tables, which replaces the live tables on commit. This
//! gives serializable isolation and all-or-nothing visibility. Non-transactional
//! calls wait while a transaction is open, so a caller must not read through
//! the store while holding one of its transactions.
//!
//! Call counters and failure injection make the store usable as a test double.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex as StdMutex};
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

use super::{FeatureStore, ProvisioningTransaction, UserStore};
use crate::error::{DuplicateField, StoreError};
use crate::models::{
    Environment, Flag, FlagDetails, FlagSetting, FlagSettingView, NewEnvironment, NewFlag,
    NewFlagSetting, NewProject, NewUser, Project, User,
};

/// A step of a provisioning transaction where a failure can be injected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TxStep {
    LockProject,
    InsertEnvironment,
    InsertFlag,
    InsertFlagSettings,
    AppendEnvironment,
    AppendFlag,
    Commit,
}

#[derive(Debug, Clone, Default)]
struct Tables {
    users: Vec<User>,
    projects: HashMap<Uuid, Project>,
    environments: Vec<Environment>,
    flags: Vec<Flag>,
    flag_settings: Vec<FlagSetting>,
}

#[derive(Debug, Default)]
struct Faults {
    tx_step: Option<TxStep>,
    stall_step: Option<TxStep>,
    flag_details: bool,
}

/// Number of calls made to selected store operations.
#[derive(Debug, Default)]
pub struct CallCounts {
    insert_project: AtomicU64,
    find_flag_details: AtomicU64,
    begin: AtomicU64,
    commit: AtomicU64,
}

impl CallCounts {
    pub fn insert_project(&self) -> u64 {
        self.insert_project.load(Ordering::SeqCst)
    }

    pub fn find_flag_details(&self) -> u64 {
        self.find_flag_details.load(Ordering::SeqCst)
    }

    pub fn begin(&self) -> u64 {
        self.begin.load(Ordering::SeqCst)
    }

    pub fn commit(&self) -> u64 {
        self.commit.load(Ordering::SeqCst)
    }
}

/// Complete in-process implementation of [`FeatureStore`] and [`UserStore`].
#[derive(Clone, Default)]
pub struct InMemoryStore {
    tables: Arc<Mutex<Tables>>,
    faults: Arc<StdMutex<Faults>>,
    calls: Arc<CallCounts>,
}

fn injected(step: &str) -> StoreError {
    StoreError::Conflict(format!("injected failure at {}", step))
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Call counters for this store and all its clones.
    pub fn calls(&self) -> &CallCounts {
        &self.calls
    }

    /// Makes every following transaction fail at `step` until cleared.
    pub fn fail_transaction_at(&self, step: Option<TxStep>) {
        if let Ok(mut faults) = self.faults.lock() {
            faults.tx_step = step;
        }
    }

    /// Makes every following transaction wait forever when it reaches `step`,
    /// until cleared. The caller is expected to drop the pending future.
    pub fn stall_transaction_at(&self, step: Option<TxStep>) {
        if let Ok(mut faults) = self.faults.lock() {
            faults.stall_step = step;
        }
    }

    /// Makes `find_flag_details` fail until cleared.
    pub fn fail_flag_details(&self, fail: bool) {
        if let Ok(mut faults) = self.faults.lock() {
            faults.flag_details = fail;
        }
    }

    fn injected_tx_step(&self) -> Option<TxStep> {
        self.faults.lock().ok().and_then(|f| f.tx_step)
    }

    fn stalled_tx_step(&self) -> Option<TxStep> {
        self.faults.lock().ok().and_then(|f| f.stall_step)
    }

    /// Returns a project by id.
    pub async fn project(&self, id: Uuid) -> Option<Project> {
        self.tables.lock().await.projects.get(&id).cloned()
    }

    /// Returns every environment of a project.
    pub async fn environments(&self, project_id: Uuid) -> Vec<Environment> {
        self.tables
            .lock()
            .await
            .environments
            .iter()
            .filter(|e| e.project_id == project_id)
            .cloned()
            .collect()
    }

    /// Returns every flag of a project.
    pub async fn flags(&self, project_id: Uuid) -> Vec<Flag> {
        self.tables
            .lock()
            .await
            .flags
            .iter()
            .filter(|f| f.project_id == project_id)
            .cloned()
            .collect()
    }

    /// Returns every flag setting of a project.
    pub async fn flag_settings(&self, project_id: Uuid) -> Vec<FlagSetting> {
        self.tables
            .lock()
            .await
            .flag_settings
            .iter()
            .filter(|s| s.project_id == project_id)
            .cloned()
            .collect()
    }

    /// Writes a second setting for an existing triple, bypassing the
    /// uniqueness check. Used to simulate corrupted data.
    pub async fn insert_duplicate_setting(&self, setting: &FlagSetting) -> Uuid {
        let mut tables = self.tables.lock().await;
        let copy = FlagSetting {
            id: Uuid::new_v4(),
            ..setting.clone()
        };
        let id = copy.id;
        if let Some(project) = tables.projects.get_mut(&copy.project_id) {
            project.flag_setting_ids.push(id);
        }
        tables.flag_settings.push(copy);
        id
    }

    /// Deletes a flag setting and its project reference. Used to simulate
    /// corrupted data.
    pub async fn remove_flag_setting(&self, id: Uuid) {
        let mut tables = self.tables.lock().await;
        tables.flag_settings.retain(|s| s.id != id);
        for project in tables.projects.values_mut() {
            project.flag_setting_ids.retain(|s| *s != id);
        }
    }
}

#[async_trait]
impl FeatureStore for InMemoryStore {
    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn insert_project(&self, project: NewProject) -> Result<Project, StoreError> {
        self.calls.insert_project.fetch_add(1, Ordering::SeqCst);
        let mut tables = self.tables.lock().await;

        if tables
            .projects
            .values()
            .any(|p| p.created_by == project.created_by && p.name == project.name)
        {
            return Err(StoreError::Duplicate(DuplicateField::ProjectName));
        }
        if tables.projects.values().any(|p| p.key == project.key) {
            return Err(StoreError::Duplicate(DuplicateField::ProjectKey));
        }

        let now = Utc::now();
        let created = Project {
            id: Uuid::new_v4(),
            key: project.key,
            name: project.name,
            environment_ids: vec![],
            flag_ids: vec![],
            flag_setting_ids: vec![],
            created_by: project.created_by,
            created_at: now,
            updated_at: now,
        };
        tables.projects.insert(created.id, created.clone());
        Ok(created)
    }

    async fn find_project_by_name(
        &self,
        owner: Uuid,
        name: &str,
    ) -> Result<Option<Project>, StoreError> {
        let tables = self.tables.lock().await;
        Ok(tables
            .projects
            .values()
            .find(|p| p.created_by == owner && p.name == name)
            .cloned())
    }

    async fn find_environment_by_name(
        &self,
        project_id: Uuid,
        name: &str,
    ) -> Result<Option<Environment>, StoreError> {
        let tables = self.tables.lock().await;
        Ok(tables
            .environments
            .iter()
            .find(|e| e.project_id == project_id && e.name == name)
            .cloned())
    }

    async fn find_flag_by_name(
        &self,
        project_id: Uuid,
        name: &str,
    ) -> Result<Option<Flag>, StoreError> {
        let tables = self.tables.lock().await;
        Ok(tables
            .flags
            .iter()
            .find(|f| f.project_id == project_id && f.name == name)
            .cloned())
    }

    async fn update_flag_setting_status(
        &self,
        project_id: Uuid,
        environment_id: Uuid,
        flag_id: Uuid,
        is_active: bool,
    ) -> Result<u64, StoreError> {
        let mut tables = self.tables.lock().await;
        let now = Utc::now();
        let mut matched = 0;
        for setting in tables.flag_settings.iter_mut().filter(|s| {
            s.project_id == project_id && s.environment_id == environment_id && s.flag_id == flag_id
        }) {
            setting.is_active = is_active;
            setting.updated_at = now;
            matched += 1;
        }
        Ok(matched)
    }

    async fn list_flag_settings(
        &self,
        project_id: Uuid,
    ) -> Result<Vec<FlagSettingView>, StoreError> {
        let tables = self.tables.lock().await;
        let Some(project) = tables.projects.get(&project_id) else {
            return Ok(vec![]);
        };

        let mut rows = Vec::new();
        for env_id in &project.environment_ids {
            let Some(env) = tables.environments.iter().find(|e| e.id == *env_id) else {
                continue;
            };
            for flag_id in &project.flag_ids {
                let Some(flag) = tables.flags.iter().find(|f| f.id == *flag_id) else {
                    continue;
                };
                rows.extend(
                    tables
                        .flag_settings
                        .iter()
                        .filter(|s| {
                            s.project_id == project_id
                                && s.environment_id == env.id
                                && s.flag_id == flag.id
                        })
                        .map(|s| FlagSettingView {
                            environment: env.name.clone(),
                            flag: flag.name.clone(),
                            is_active: s.is_active,
                            updated_at: s.updated_at,
                        }),
                );
            }
        }
        Ok(rows)
    }

    async fn find_flag_details(
        &self,
        project_key: &str,
        environment_name: &str,
        flag_name: &str,
    ) -> Result<Vec<FlagDetails>, StoreError> {
        self.calls.find_flag_details.fetch_add(1, Ordering::SeqCst);
        if self.faults.lock().map(|f| f.flag_details).unwrap_or(false) {
            return Err(injected("find_flag_details"));
        }

        let tables = self.tables.lock().await;
        let mut rows = Vec::new();

        for project in tables.projects.values().filter(|p| p.key == project_key) {
            let environments = tables
                .environments
                .iter()
                .filter(|e| project.environment_ids.contains(&e.id) && e.name == environment_name);
            for env in environments {
                let flags = tables
                    .flags
                    .iter()
                    .filter(|f| project.flag_ids.contains(&f.id) && f.name == flag_name);
                for flag in flags {
                    rows.extend(
                        tables
                            .flag_settings
                            .iter()
                            .filter(|s| {
                                project.flag_setting_ids.contains(&s.id)
                                    && s.project_id == project.id
                                    && s.environment_id == env.id
                                    && s.flag_id == flag.id
                            })
                            .map(|s| FlagDetails {
                                project_id: project.id,
                                project_key: project.key.clone(),
                                environment_id: env.id,
                                environment_name: env.name.clone(),
                                flag_id: flag.id,
                                flag_name: flag.name.clone(),
                                setting: s.clone(),
                            }),
                    );
                }
            }
        }

        Ok(rows)
    }

    async fn begin(&self) -> Result<Box<dyn ProvisioningTransaction>, StoreError> {
        self.calls.begin.fetch_add(1, Ordering::SeqCst);
        let guard = self.tables.clone().lock_owned().await;
        let staged = guard.clone();
        Ok(Box::new(InMemoryTransaction {
            guard,
            staged,
            fail_at: self.injected_tx_step(),
            stall_at: self.stalled_tx_step(),
            calls: self.calls.clone(),
        }))
    }
}

/// Transaction over an [`InMemoryStore`].
pub struct InMemoryTransaction {
    guard: OwnedMutexGuard<Tables>,
    staged: Tables,
    fail_at: Option<TxStep>,
    stall_at: Option<TxStep>,
    calls: Arc<CallCounts>,
}

impl InMemoryTransaction {
    async fn check(&self, step: TxStep) -> Result<(), StoreError> {
        if self.stall_at == Some(step) {
            std::future::pending::<()>().await;
        }
        if self.fail_at == Some(step) {
            return Err(injected(&format!("{:?}", step)));
        }
        Ok(())
    }

    fn project_mut(&mut self, project_id: Uuid) -> Result<&mut Project, StoreError> {
        self.staged
            .projects
            .get_mut(&project_id)
            .ok_or_else(|| StoreError::Other(format!("project {} does not exist", project_id)))
    }
}

#[async_trait]
impl ProvisioningTransaction for InMemoryTransaction {
    async fn lock_project(&mut self, project_id: Uuid) -> Result<Option<Project>, StoreError> {
        self.check(TxStep::LockProject).await?;
        Ok(self.staged.projects.get(&project_id).cloned())
    }

    async fn insert_environment(
        &mut self,
        environment: NewEnvironment,
    ) -> Result<Environment, StoreError> {
        self.check(TxStep::InsertEnvironment).await?;
        if self
            .staged
            .environments
            .iter()
            .any(|e| e.project_id == environment.project_id && e.name == environment.name)
        {
            return Err(StoreError::Duplicate(DuplicateField::EnvironmentName));
        }

        let created = Environment {
            id: Uuid::new_v4(),
            name: environment.name,
            project_id: environment.project_id,
            created_by: environment.created_by,
            created_at: Utc::now(),
        };
        self.staged.environments.push(created.clone());
        Ok(created)
    }

    async fn insert_flag(&mut self, flag: NewFlag) -> Result<Flag, StoreError> {
        self.check(TxStep::InsertFlag).await?;
        if self
            .staged
            .flags
            .iter()
            .any(|f| f.project_id == flag.project_id && f.name == flag.name)
        {
            return Err(StoreError::Duplicate(DuplicateField::FlagName));
        }

        let created = Flag {
            id: Uuid::new_v4(),
            name: flag.name,
            project_id: flag.project_id,
            created_by: flag.created_by,
            created_at: Utc::now(),
        };
        self.staged.flags.push(created.clone());
        Ok(created)
    }

    async fn insert_flag_settings(
        &mut self,
        settings: Vec<NewFlagSetting>,
    ) -> Result<Vec<FlagSetting>, StoreError> {
        if settings.is_empty() {
            return Ok(vec![]);
        }
        self.check(TxStep::InsertFlagSettings).await?;

        let now = Utc::now();
        let mut created = Vec::with_capacity(settings.len());
        for setting in settings {
            let exists = self.staged.flag_settings.iter().any(|s| {
                s.project_id == setting.project_id
                    && s.environment_id == setting.environment_id
                    && s.flag_id == setting.flag_id
            });
            if exists {
                return Err(StoreError::Duplicate(DuplicateField::FlagSetting));
            }

            let row = FlagSetting {
                id: Uuid::new_v4(),
                project_id: setting.project_id,
                environment_id: setting.environment_id,
                flag_id: setting.flag_id,
                is_active: setting.is_active,
                created_at: now,
                updated_at: now,
            };
            self.staged.flag_settings.push(row.clone());
            created.push(row);
        }
        Ok(created)
    }

    async fn append_environment(
        &mut self,
        project_id: Uuid,
        environment_id: Uuid,
        setting_ids: &[Uuid],
    ) -> Result<(), StoreError> {
        self.check(TxStep::AppendEnvironment).await?;
        let project = self.project_mut(project_id)?;
        project.environment_ids.push(environment_id);
        project.flag_setting_ids.extend_from_slice(setting_ids);
        project.updated_at = Utc::now();
        Ok(())
    }

    async fn append_flag(
        &mut self,
        project_id: Uuid,
        flag_id: Uuid,
        setting_ids: &[Uuid],
    ) -> Result<(), StoreError> {
        self.check(TxStep::AppendFlag).await?;
        let project = self.project_mut(project_id)?;
        project.flag_ids.push(flag_id);
        project.flag_setting_ids.extend_from_slice(setting_ids);
        project.updated_at = Utc::now();
        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        self.check(TxStep::Commit).await?;
        let this = *self;
        let mut guard = this.guard;
        *guard = this.staged;
        this.calls.commit.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[async_trait]
impl UserStore for InMemoryStore {
    async fn insert_user(&self, user: NewUser) -> Result<User, StoreError> {
        let mut tables = self.tables.lock().await;
        if tables.users.iter().any(|u| u.username == user.username) {
            return Err(StoreError::Duplicate(DuplicateField::Username));
        }

        let now = Utc::now();
        let created = User {
            id: Uuid::new_v4(),
            username: user.username,
            display_name: user.display_name,
            email: user.email,
            password_hash: user.password_hash,
            created_at: now,
            updated_at: now,
        };
        tables.users.push(created.clone());
        Ok(created)
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let tables = self.tables.lock().await;
        Ok(tables.users.iter().find(|u| u.username == username).cloned())
    }

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let tables = self.tables.lock().await;
        Ok(tables.users.iter().find(|u| u.id == id).cloned())
    }

    async fn update_password(&self, id: Uuid, password_hash: &str) -> Result<u64, StoreError> {
        let mut tables = self.tables.lock().await;
        match tables.users.iter_mut().find(|u| u.id == id) {
            Some(user) => {
                user.password_hash = password_hash.to_string();
                user.updated_at = Utc::now();
                Ok(1)
            }
            None => Ok(0),
        }
    }
}

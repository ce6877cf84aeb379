//! Project key allocation.

use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{CoreError, DuplicateField, EntityKind, StoreError};
use crate::models::{NewProject, Project};
use crate::store::FeatureStore;

/// Number of insert attempts before giving up on a key.
pub const DEFAULT_KEY_ALLOCATION_ATTEMPTS: u32 = 5;

/// Source of candidate project keys.
pub trait ProjectKeyGenerator: Send + Sync {
    fn generate(&self) -> String;
}

/// Generates 32-character alphanumeric keys.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomKeyGenerator;

impl ProjectKeyGenerator for RandomKeyGenerator {
    fn generate(&self) -> String {
        shared::crypto::generate_project_key()
    }
}

/// Creates projects with a unique random key.
///
/// A key collision on insert is retried with a fresh key, up to
/// `max_attempts` inserts. A project name clash is never retried.
#[derive(Clone)]
pub struct KeyAllocator {
    generator: Arc<dyn ProjectKeyGenerator>,
    max_attempts: u32,
}

impl KeyAllocator {
    pub fn new(max_attempts: u32) -> Self {
        Self::with_generator(Arc::new(RandomKeyGenerator), max_attempts)
    }

    pub fn with_generator(generator: Arc<dyn ProjectKeyGenerator>, max_attempts: u32) -> Self {
        Self {
            generator,
            max_attempts: max_attempts.max(1),
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Inserts a new project owned by `creator_id` under a freshly allocated key.
    pub async fn allocate(
        &self,
        store: &dyn FeatureStore,
        creator_id: Uuid,
        name: &str,
    ) -> Result<Project, CoreError> {
        for attempt in 1..=self.max_attempts {
            let candidate = NewProject {
                key: self.generator.generate(),
                name: name.to_string(),
                created_by: creator_id,
            };

            match store.insert_project(candidate).await {
                Ok(project) => {
                    info!(
                        project_id = %project.id,
                        creator_id = %creator_id,
                        attempt = attempt,
                        "Project key allocated"
                    );
                    return Ok(project);
                }
                Err(StoreError::Duplicate(DuplicateField::ProjectKey)) => {
                    warn!(
                        creator_id = %creator_id,
                        attempt = attempt,
                        max_attempts = self.max_attempts,
                        "Project key collision, regenerating"
                    );
                }
                Err(err) => return Err(CoreError::from_store_write(err, EntityKind::Project, name)),
            }
        }

        warn!(
            creator_id = %creator_id,
            attempts = self.max_attempts,
            "Project key allocation exhausted"
        );
        Err(CoreError::AllocationFailed {
            attempts: self.max_attempts,
        })
    }
}

impl Default for KeyAllocator {
    fn default() -> Self {
        Self::new(DEFAULT_KEY_ALLOCATION_ATTEMPTS)
    }
}

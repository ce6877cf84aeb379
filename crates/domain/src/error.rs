//! Error taxonomy for the core operations.
//!
//! Store adapters report [`StoreError`]; the provisioning coordinator and the
//! evaluation resolver translate those into [`CoreError`] so raw store errors
//! never reach callers.

use std::fmt;
use thiserror::Error;

/// Kind of entity referenced by an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    User,
    Project,
    Environment,
    Flag,
    FlagSetting,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::User => "user",
            EntityKind::Project => "project",
            EntityKind::Environment => "environment",
            EntityKind::Flag => "flag",
            EntityKind::FlagSetting => "flag setting",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Column set whose uniqueness constraint rejected a write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DuplicateField {
    ProjectKey,
    ProjectName,
    EnvironmentName,
    FlagName,
    FlagSetting,
    Username,
    Unknown,
}

impl fmt::Display for DuplicateField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DuplicateField::ProjectKey => "project key",
            DuplicateField::ProjectName => "project name",
            DuplicateField::EnvironmentName => "environment name",
            DuplicateField::FlagName => "flag name",
            DuplicateField::FlagSetting => "flag setting",
            DuplicateField::Username => "username",
            DuplicateField::Unknown => "unknown constraint",
        };
        f.write_str(s)
    }
}

/// Errors reported by store adapters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("Unique constraint violated: {0}")]
    Duplicate(DuplicateField),

    #[error("Transaction conflict: {0}")]
    Conflict(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Store error: {0}")]
    Other(String),
}

/// Internal consistency failures. These are never retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvariantViolation {
    /// A status update matched no flag setting for an existing
    /// (project, environment, flag) triple.
    #[error("no flag setting matched the (project, environment, flag) triple")]
    NoMatch,

    /// The evaluation join returned more than one row.
    #[error("expected exactly one flag setting, found {0}")]
    IncorrectResultCardinality(usize),

    /// A provisioning write tried to create a second flag setting for a triple.
    #[error("a flag setting already exists for the (project, environment, flag) triple")]
    DuplicateFlagSetting,
}

/// Coarse classification of [`CoreError`] for callers that only care about
/// the kind of failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    AlreadyExists,
    PreconditionFailed,
    TransientStoreFailure,
    StoreFailure,
    InvariantViolation,
    AllocationFailed,
}

/// Errors returned by the core operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    #[error("{0} not found")]
    NotFound(EntityKind),

    #[error("{kind} '{name}' already exists")]
    DuplicateName { kind: EntityKind, name: String },

    #[error("No environments are configured for the project")]
    NoEnvironmentsConfigured,

    /// The transaction could not start or commit. Retrying may succeed.
    #[error("Store failure: {0}")]
    TransientStoreFailure(String),

    /// The store rejected or could not decode an operation. Not retried.
    #[error("Store error: {0}")]
    StoreFailure(String),

    #[error("Invariant violated: {0}")]
    InvariantViolation(InvariantViolation),

    #[error("Could not allocate a unique project key after {attempts} attempts")]
    AllocationFailed { attempts: u32 },
}

impl CoreError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CoreError::NotFound(_) => ErrorKind::NotFound,
            CoreError::DuplicateName { .. } => ErrorKind::AlreadyExists,
            CoreError::NoEnvironmentsConfigured => ErrorKind::PreconditionFailed,
            CoreError::TransientStoreFailure(_) => ErrorKind::TransientStoreFailure,
            CoreError::StoreFailure(_) => ErrorKind::StoreFailure,
            CoreError::InvariantViolation(_) => ErrorKind::InvariantViolation,
            CoreError::AllocationFailed { .. } => ErrorKind::AllocationFailed,
        }
    }

    /// Returns true if the caller may retry the operation unchanged.
    pub fn is_retryable(&self) -> bool {
        matches!(self, CoreError::TransientStoreFailure(_))
    }

    /// Translates a store error raised while writing a named entity.
    pub fn from_store_write(err: StoreError, kind: EntityKind, name: &str) -> Self {
        match err {
            StoreError::Duplicate(DuplicateField::FlagSetting) => {
                CoreError::InvariantViolation(InvariantViolation::DuplicateFlagSetting)
            }
            StoreError::Duplicate(DuplicateField::Unknown) => err.into(),
            StoreError::Duplicate(_) => CoreError::DuplicateName {
                kind,
                name: name.to_string(),
            },
            other => other.into(),
        }
    }
}

impl From<InvariantViolation> for CoreError {
    fn from(violation: InvariantViolation) -> Self {
        CoreError::InvariantViolation(violation)
    }
}

impl From<StoreError> for CoreError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Duplicate(DuplicateField::FlagSetting) => {
                CoreError::InvariantViolation(InvariantViolation::DuplicateFlagSetting)
            }
            other @ (StoreError::Unavailable(_) | StoreError::Conflict(_)) => {
                CoreError::TransientStoreFailure(other.to_string())
            }
            other @ (StoreError::Duplicate(_) | StoreError::Other(_)) => {
                CoreError::StoreFailure(other.to_string())
            }
        }
    }
}

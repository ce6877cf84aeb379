//! Translation of sqlx errors into store errors.

use domain::error::{DuplicateField, StoreError};

/// PostgreSQL SQLSTATE for a unique constraint violation.
const UNIQUE_VIOLATION: &str = "23505";
const SERIALIZATION_FAILURE: &str = "40001";
const DEADLOCK_DETECTED: &str = "40P01";

/// Maps a unique constraint name to the field it protects.
pub fn duplicate_field(constraint: Option<&str>) -> DuplicateField {
    match constraint {
        Some("uq_projects_key") => DuplicateField::ProjectKey,
        Some("uq_projects_owner_name") => DuplicateField::ProjectName,
        Some("uq_environments_project_name") => DuplicateField::EnvironmentName,
        Some("uq_flags_project_name") => DuplicateField::FlagName,
        Some("uq_flag_settings_triple") => DuplicateField::FlagSetting,
        Some("uq_users_username") => DuplicateField::Username,
        _ => DuplicateField::Unknown,
    }
}

/// Converts a sqlx error into a [`StoreError`].
pub fn map_sqlx_error(err: sqlx::Error) -> StoreError {
    match &err {
        sqlx::Error::Database(db_err) => match db_err.code().as_deref() {
            Some(UNIQUE_VIOLATION) => StoreError::Duplicate(duplicate_field(db_err.constraint())),
            Some(SERIALIZATION_FAILURE) | Some(DEADLOCK_DETECTED) => {
                StoreError::Conflict(db_err.message().to_string())
            }
            _ => StoreError::Other(err.to_string()),
        },
        sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::Io(_)
        | sqlx::Error::WorkerCrashed => StoreError::Unavailable(err.to_string()),
        _ => StoreError::Other(err.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_field_by_constraint() {
        assert_eq!(duplicate_field(Some("uq_projects_key")), DuplicateField::ProjectKey);
        assert_eq!(
            duplicate_field(Some("uq_projects_owner_name")),
            DuplicateField::ProjectName
        );
        assert_eq!(
            duplicate_field(Some("uq_flag_settings_triple")),
            DuplicateField::FlagSetting
        );
        assert_eq!(duplicate_field(Some("other")), DuplicateField::Unknown);
        assert_eq!(duplicate_field(None), DuplicateField::Unknown);
    }

    #[test]
    fn test_pool_timeout_is_unavailable() {
        assert!(matches!(
            map_sqlx_error(sqlx::Error::PoolTimedOut),
            StoreError::Unavailable(_)
        ));
    }

    #[test]
    fn test_row_not_found_is_other() {
        assert!(matches!(
            map_sqlx_error(sqlx::Error::RowNotFound),
            StoreError::Other(_)
        ));
    }
}

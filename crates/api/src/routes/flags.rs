//! Flag evaluation route used by client SDKs.

use axum::{
    extract::{Path, State},
    Json,
};
use domain::models::flag::FlagStatusResponse;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::ProjectKey;
use crate::middleware::metrics::record_flag_evaluation;

/// GET /api/v1/flags/:environment/:flag
///
/// Authenticated by the `X-Project-Key` header rather than a user token.
/// Served from the status cache when possible, so a status change may take up
/// to the cache TTL to show up here.
pub async fn get_flag_status(
    State(state): State<AppState>,
    ProjectKey(project_key): ProjectKey,
    Path((environment, flag)): Path<(String, String)>,
) -> Result<Json<FlagStatusResponse>, ApiError> {
    match state
        .resolver
        .get_flag_status(&project_key, &environment, &flag)
        .await
    {
        Ok(status) => {
            record_flag_evaluation(if status { "active" } else { "inactive" });
            Ok(Json(FlagStatusResponse {
                environment,
                flag,
                status,
            }))
        }
        Err(e) => {
            let err = ApiError::from(e);
            record_flag_evaluation(match err {
                ApiError::NotFound(_) => "not_found",
                ApiError::ServiceUnavailable(_) => "unavailable",
                _ => "error",
            });
            Err(err)
        }
    }
}

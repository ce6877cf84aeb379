//! Project management routes.
//!
//! All of these act on projects owned by the authenticated user. A project
//! created by someone else is reported as not found.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use domain::models::environment::{CreateEnvironmentRequest, CreateEnvironmentResponse};
use domain::models::flag::{
    CreateFlagRequest, CreateFlagResponse, FlagStatusResponse, UpdateFlagStatusRequest,
};
use domain::models::flag_setting::ListFlagSettingsResponse;
use domain::models::project::{CreateProjectRequest, CreateProjectResponse, ProjectKeyResponse};
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::UserAuth;
use crate::middleware::metrics::record_provisioned;

/// POST /api/v1/projects
pub async fn create_project(
    State(state): State<AppState>,
    user: UserAuth,
    Json(req): Json<CreateProjectRequest>,
) -> Result<(StatusCode, Json<CreateProjectResponse>), ApiError> {
    req.validate()?;

    let project = state
        .coordinator
        .create_project(user.user_id, &req.name)
        .await?;
    record_provisioned("project", 0);

    Ok((
        StatusCode::CREATED,
        Json(CreateProjectResponse {
            id: project.id,
            name: project.name,
            created_at: project.created_at,
        }),
    ))
}

/// GET /api/v1/projects/:project/key
pub async fn get_project_key(
    State(state): State<AppState>,
    user: UserAuth,
    Path(project): Path<String>,
) -> Result<Json<ProjectKeyResponse>, ApiError> {
    let project_key = state
        .coordinator
        .get_project_key(&project, user.user_id)
        .await?;

    Ok(Json(ProjectKeyResponse { project_key }))
}

/// GET /api/v1/projects/:project/settings
pub async fn list_flag_settings(
    State(state): State<AppState>,
    user: UserAuth,
    Path(project): Path<String>,
) -> Result<Json<ListFlagSettingsResponse>, ApiError> {
    let data = state
        .coordinator
        .list_flag_settings(&project, user.user_id)
        .await?;

    Ok(Json(ListFlagSettingsResponse {
        count: data.len(),
        data,
    }))
}

/// POST /api/v1/projects/:project/environments
pub async fn create_environment(
    State(state): State<AppState>,
    user: UserAuth,
    Path(project): Path<String>,
    Json(req): Json<CreateEnvironmentRequest>,
) -> Result<(StatusCode, Json<CreateEnvironmentResponse>), ApiError> {
    req.validate()?;

    let provisioned = state
        .coordinator
        .create_environment(&project, &req.name, user.user_id)
        .await?;
    record_provisioned("environment", provisioned.flag_settings.len());

    Ok((
        StatusCode::CREATED,
        Json(CreateEnvironmentResponse {
            id: provisioned.environment.id,
            name: provisioned.environment.name,
            flag_settings_created: provisioned.flag_settings.len(),
        }),
    ))
}

/// POST /api/v1/projects/:project/flags
///
/// Returns 412 while the project has no environments.
pub async fn create_flag(
    State(state): State<AppState>,
    user: UserAuth,
    Path(project): Path<String>,
    Json(req): Json<CreateFlagRequest>,
) -> Result<(StatusCode, Json<CreateFlagResponse>), ApiError> {
    req.validate()?;

    let provisioned = state
        .coordinator
        .create_flag(&project, &req.name, user.user_id)
        .await?;
    record_provisioned("flag", provisioned.flag_settings.len());

    Ok((
        StatusCode::CREATED,
        Json(CreateFlagResponse {
            id: provisioned.flag.id,
            name: provisioned.flag.name,
            flag_settings_created: provisioned.flag_settings.len(),
        }),
    ))
}

/// PUT /api/v1/projects/:project/environments/:environment/flags/:flag
pub async fn update_flag_status(
    State(state): State<AppState>,
    user: UserAuth,
    Path((project, environment, flag)): Path<(String, String, String)>,
    Json(req): Json<UpdateFlagStatusRequest>,
) -> Result<Json<FlagStatusResponse>, ApiError> {
    state
        .coordinator
        .update_flag_status(&project, &environment, &flag, req.is_active, user.user_id)
        .await?;

    Ok(Json(FlagStatusResponse {
        environment,
        flag,
        status: req.is_active,
    }))
}

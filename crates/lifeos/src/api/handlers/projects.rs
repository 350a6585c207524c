//! Project handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use tracing::{info, instrument};

use super::super::error::{ApiError, ApiResult};
use super::super::state::AppState;
use crate::auth::CurrentUser;
use crate::projects::{CreateProjectRequest, Project, ProjectListQuery, UpdateProjectRequest};

/// List active projects, newest first.
#[instrument(skip(state, user), fields(user_id = %user.id()))]
pub async fn list_projects(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(query): Query<ProjectListQuery>,
) -> ApiResult<Json<Vec<Project>>> {
    let projects = state.projects.list(user.id(), &query).await?;
    Ok(Json(projects))
}

/// Create a project.
#[instrument(skip(state, user, request), fields(user_id = %user.id()))]
pub async fn create_project(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(request): Json<CreateProjectRequest>,
) -> ApiResult<(StatusCode, Json<Project>)> {
    if request.validated_name().is_none() {
        return Err(ApiError::bad_request("Project name is required"));
    }

    let project = state.projects.create(user.id(), request).await?;
    info!("Created project {} ({})", project.id, project.name);
    Ok((StatusCode::CREATED, Json(project)))
}

pub async fn get_project(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<Json<Project>> {
    state
        .projects
        .get(user.id(), &id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found(format!("Project {}", id)))
}

/// Update a project's label, description, color or visibility.
#[instrument(skip(state, user, request), fields(user_id = %user.id()))]
pub async fn update_project(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(request): Json<UpdateProjectRequest>,
) -> ApiResult<Json<Project>> {
    if request.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
        return Err(ApiError::bad_request("Project name cannot be blank"));
    }

    state
        .projects
        .update(user.id(), &id, request)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found(format!("Project {}", id)))
}

/// Archive a project. Its messages are kept.
#[instrument(skip(state, user), fields(user_id = %user.id()))]
pub async fn archive_project(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    if state.projects.archive(user.id(), &id).await? {
        info!("Archived project {}", id);
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found(format!("Project {}", id)))
    }
}

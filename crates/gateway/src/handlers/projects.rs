//! Project management handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::AppState;
use formsmith_common::{
    auth::AuthContext,
    db::Repository,
    errors::{AppError, Result},
};

/// Request to create or rename a project
#[derive(Debug, Deserialize, Validate)]
pub struct ProjectInput {
    #[validate(length(min = 3, max = 100))]
    pub name: String,
}

/// Response for a single project
#[derive(Serialize)]
pub struct ProjectResponse {
    pub id: Uuid,
    pub name: String,
    pub form_count: u64,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Serialize)]
pub struct ProjectListResponse {
    pub projects: Vec<ProjectResponse>,
}

/// Create a new project
pub async fn create_project(
    State(state): State<AppState>,
    auth: AuthContext,
    Json(request): Json<ProjectInput>,
) -> Result<(StatusCode, Json<ProjectResponse>)> {
    request.validate().map_err(|e| AppError::Validation {
        message: e.to_string(),
        field: Some("name".to_string()),
    })?;

    let repo = Repository::new(state.db.clone());
    let project = repo.create_project(auth.user_id, request.name).await?;

    tracing::info!(
        project_id = %project.id,
        owner_id = %auth.user_id,
        "Project created"
    );

    Ok((
        StatusCode::CREATED,
        Json(ProjectResponse {
            id: project.id,
            name: project.name,
            form_count: 0,
            created_at: project.created_at.to_rfc3339(),
            updated_at: project.updated_at.to_rfc3339(),
        }),
    ))
}

/// List the caller's projects, newest first
pub async fn list_projects(
    State(state): State<AppState>,
    auth: AuthContext,
) -> Result<Json<ProjectListResponse>> {
    let repo = Repository::new(state.db.clone());

    let mut projects = Vec::new();
    for project in repo.list_projects(auth.user_id).await? {
        let form_count = repo.count_forms(project.id).await?;
        projects.push(ProjectResponse {
            id: project.id,
            name: project.name,
            form_count,
            created_at: project.created_at.to_rfc3339(),
            updated_at: project.updated_at.to_rfc3339(),
        });
    }

    Ok(Json(ProjectListResponse { projects }))
}

/// Rename a project
pub async fn rename_project(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(project_id): Path<Uuid>,
    Json(request): Json<ProjectInput>,
) -> Result<Json<ProjectResponse>> {
    request.validate().map_err(|e| AppError::Validation {
        message: e.to_string(),
        field: Some("name".to_string()),
    })?;

    let repo = Repository::new(state.db.clone());
    let project = repo
        .rename_project(auth.user_id, project_id, request.name)
        .await?;
    let form_count = repo.count_forms(project.id).await?;

    Ok(Json(ProjectResponse {
        id: project.id,
        name: project.name,
        form_count,
        created_at: project.created_at.to_rfc3339(),
        updated_at: project.updated_at.to_rfc3339(),
    }))
}

/// Delete a project and everything under it
pub async fn delete_project(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(project_id): Path<Uuid>,
) -> Result<StatusCode> {
    let repo = Repository::new(state.db.clone());
    repo.delete_project(auth.user_id, project_id).await?;

    tracing::info!(
        project_id = %project_id,
        owner_id = %auth.user_id,
        "Project deleted"
    );

    Ok(StatusCode::NO_CONTENT)
}

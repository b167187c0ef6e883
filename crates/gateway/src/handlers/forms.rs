//! Form management handlers

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
    db::{models::Field, Repository},
    errors::{AppError, Result},
};

/// Request to create a new form
#[derive(Debug, Deserialize, Validate)]
pub struct CreateFormRequest {
    pub project_id: Uuid,

    #[validate(length(min = 3, max = 100))]
    pub name: String,
}

/// Request to rename a form
#[derive(Debug, Deserialize, Validate)]
pub struct RenameFormRequest {
    #[validate(length(min = 3, max = 100))]
    pub name: String,
}

/// A field as returned by the API, in question order
#[derive(Serialize)]
pub struct FieldResponse {
    pub id: Uuid,
    pub key: String,
    pub label: String,
    #[serde(rename = "type")]
    pub field_type: String,
    pub required: bool,
    pub order_index: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config: Option<serde_json::Value>,
}

impl From<Field> for FieldResponse {
    fn from(field: Field) -> Self {
        Self {
            id: field.id,
            key: field.key,
            label: field.label,
            field_type: field.field_type,
            required: field.required,
            order_index: field.order_index,
            options: field.options,
            config: field.config,
        }
    }
}

/// Response for a single form
#[derive(Serialize)]
pub struct FormResponse {
    pub id: Uuid,
    pub project_id: Uuid,
    pub name: String,
    pub slug: String,
    pub fields_version: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<FieldResponse>>,
    pub created_at: String,
    pub updated_at: String,
}

/// Create a new form in one of the caller's projects
pub async fn create_form(
    State(state): State<AppState>,
    auth: AuthContext,
    Json(request): Json<CreateFormRequest>,
) -> Result<(StatusCode, Json<FormResponse>)> {
    request.validate().map_err(|e| AppError::Validation {
        message: e.to_string(),
        field: Some("name".to_string()),
    })?;

    let repo = Repository::new(state.db.clone());
    let form = repo
        .create_form(auth.user_id, request.project_id, request.name)
        .await?;

    tracing::info!(
        form_id = %form.id,
        project_id = %form.project_id,
        slug = %form.slug,
        "Form created"
    );

    Ok((
        StatusCode::CREATED,
        Json(FormResponse {
            id: form.id,
            project_id: form.project_id,
            name: form.name,
            slug: form.slug,
            fields_version: form.fields_version,
            fields: Some(Vec::new()),
            created_at: form.created_at.to_rfc3339(),
            updated_at: form.updated_at.to_rfc3339(),
        }),
    ))
}

/// Get a form with its fields in question order
pub async fn get_form(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(form_id): Path<Uuid>,
) -> Result<Json<FormResponse>> {
    let repo = Repository::new(state.db.clone());

    let form = repo
        .find_form(auth.user_id, form_id)
        .await?
        .ok_or_else(|| AppError::FormNotFound {
            id: form_id.to_string(),
        })?;

    let fields = repo
        .list_fields(form.id)
        .await?
        .into_iter()
        .map(FieldResponse::from)
        .collect();

    Ok(Json(FormResponse {
        id: form.id,
        project_id: form.project_id,
        name: form.name,
        slug: form.slug,
        fields_version: form.fields_version,
        fields: Some(fields),
        created_at: form.created_at.to_rfc3339(),
        updated_at: form.updated_at.to_rfc3339(),
    }))
}

/// Rename a form. The public slug never changes after creation.
pub async fn rename_form(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(form_id): Path<Uuid>,
    Json(request): Json<RenameFormRequest>,
) -> Result<Json<FormResponse>> {
    request.validate().map_err(|e| AppError::Validation {
        message: e.to_string(),
        field: Some("name".to_string()),
    })?;

    let repo = Repository::new(state.db.clone());
    let form = repo.rename_form(auth.user_id, form_id, request.name).await?;

    Ok(Json(FormResponse {
        id: form.id,
        project_id: form.project_id,
        name: form.name,
        slug: form.slug,
        fields_version: form.fields_version,
        fields: None,
        created_at: form.created_at.to_rfc3339(),
        updated_at: form.updated_at.to_rfc3339(),
    }))
}

/// Delete a form with its fields and submissions
pub async fn delete_form(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(form_id): Path<Uuid>,
) -> Result<StatusCode> {
    let repo = Repository::new(state.db.clone());
    repo.delete_form(auth.user_id, form_id).await?;

    tracing::info!(
        form_id = %form_id,
        owner_id = %auth.user_id,
        "Form deleted"
    );

    Ok(StatusCode::NO_CONTENT)
}

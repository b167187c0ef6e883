//! Field management handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::handlers::forms::FieldResponse;
use crate::AppState;
use formsmith_common::{
    auth::AuthContext,
    db::{FieldPatch, Repository},
    errors::{AppError, Result},
};
use formsmith_core::slug;

fn default_field_type() -> String {
    "text".to_string()
}

/// Request to add a field to a form
#[derive(Debug, Deserialize, Validate)]
pub struct CreateFieldRequest {
    #[validate(length(min = 1, max = 200))]
    pub label: String,

    /// Stable answer key. Derived from the label when omitted.
    #[serde(default)]
    pub key: Option<String>,

    #[serde(rename = "type", default = "default_field_type")]
    pub field_type: String,

    #[serde(default)]
    pub required: bool,

    #[serde(default)]
    pub options: Option<serde_json::Value>,

    #[serde(default)]
    pub config: Option<serde_json::Value>,
}

/// Request to update a field. Absent members leave the field untouched.
#[derive(Debug, Deserialize)]
pub struct UpdateFieldRequest {
    pub label: Option<String>,
    #[serde(rename = "type")]
    pub field_type: Option<String>,
    pub required: Option<bool>,
    pub options: Option<serde_json::Value>,
    pub config: Option<serde_json::Value>,
}

/// Request to move one field relative to another
#[derive(Debug, Deserialize)]
pub struct ReorderRequest {
    pub source_id: Uuid,
    pub target_id: Uuid,
    pub expected_version: i32,
}

/// Response after a reorder: the full sequence plus the new version
#[derive(Serialize)]
pub struct ReorderResponse {
    pub fields: Vec<FieldResponse>,
    pub fields_version: i32,
}

/// Add a field at the end of a form's question sequence
pub async fn create_field(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(form_id): Path<Uuid>,
    Json(request): Json<CreateFieldRequest>,
) -> Result<(StatusCode, Json<FieldResponse>)> {
    request.validate().map_err(|e| AppError::Validation {
        message: e.to_string(),
        field: Some("label".to_string()),
    })?;

    let key = match request.key {
        Some(key) => key,
        None => slug::field_key(&request.label),
    };
    if key.is_empty() {
        return Err(AppError::Validation {
            message: "field key cannot be empty".to_string(),
            field: Some("key".to_string()),
        });
    }

    let repo = Repository::new(state.db.clone());
    let field = repo
        .create_field(
            auth.user_id,
            form_id,
            key,
            request.label,
            request.field_type,
            request.required,
            request.options,
            request.config,
        )
        .await?;

    tracing::info!(
        field_id = %field.id,
        form_id = %form_id,
        key = %field.key,
        "Field created"
    );

    Ok((StatusCode::CREATED, Json(field.into())))
}

/// Update a field's label, type, required flag, or configuration.
/// The key and position are immutable here; position changes go
/// through the reorder endpoint.
pub async fn update_field(
    State(state): State<AppState>,
    auth: AuthContext,
    Path((form_id, field_id)): Path<(Uuid, Uuid)>,
    Json(request): Json<UpdateFieldRequest>,
) -> Result<Json<FieldResponse>> {
    if let Some(ref label) = request.label {
        if label.is_empty() || label.len() > 200 {
            return Err(AppError::Validation {
                message: "label must be between 1 and 200 characters".to_string(),
                field: Some("label".to_string()),
            });
        }
    }

    let repo = Repository::new(state.db.clone());
    let field = repo
        .update_field(
            auth.user_id,
            form_id,
            field_id,
            FieldPatch {
                label: request.label,
                field_type: request.field_type,
                required: request.required,
                options: request.options,
                config: request.config,
            },
        )
        .await?;

    Ok(Json(field.into()))
}

/// Remove a field. Surviving fields are resequenced so positions
/// stay contiguous.
pub async fn delete_field(
    State(state): State<AppState>,
    auth: AuthContext,
    Path((form_id, field_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode> {
    let repo = Repository::new(state.db.clone());
    repo.delete_field(auth.user_id, form_id, field_id).await?;

    tracing::info!(
        field_id = %field_id,
        form_id = %form_id,
        "Field deleted"
    );

    Ok(StatusCode::NO_CONTENT)
}

/// Move one field to another field's position. Stale
/// `expected_version` values are rejected with a conflict so
/// concurrent editors never silently clobber each other.
pub async fn reorder_fields(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(form_id): Path<Uuid>,
    Json(request): Json<ReorderRequest>,
) -> Result<Json<ReorderResponse>> {
    let repo = Repository::new(state.db.clone());

    let (fields, fields_version) = repo
        .reorder_fields(
            auth.user_id,
            form_id,
            request.source_id,
            request.target_id,
            request.expected_version,
        )
        .await?;

    tracing::info!(
        form_id = %form_id,
        source_id = %request.source_id,
        target_id = %request.target_id,
        fields_version,
        "Fields reordered"
    );

    Ok(Json(ReorderResponse {
        fields: fields.into_iter().map(FieldResponse::from).collect(),
        fields_version,
    }))
}

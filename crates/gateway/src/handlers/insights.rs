//! Per-field response insight handlers

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;
use uuid::Uuid;

use crate::AppState;
use formsmith_common::{
    auth::AuthContext,
    db::Repository,
    errors::{AppError, Result},
    metrics,
};
use formsmith_core::{aggregate_field, FieldInsight, FieldSpec};

#[derive(Serialize)]
pub struct InsightsResponse {
    pub form_id: Uuid,
    pub submission_count: u64,
    pub fields: Vec<FieldInsight>,
}

/// Aggregate the full submission history into one insight record per
/// field, fields in question order
pub async fn get_insights(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(form_id): Path<Uuid>,
) -> Result<Json<InsightsResponse>> {
    let repo = Repository::new(state.db.clone());

    let form = repo
        .find_form(auth.user_id, form_id)
        .await?
        .ok_or_else(|| AppError::FormNotFound {
            id: form_id.to_string(),
        })?;

    let fields = repo.list_fields(form.id).await?;
    let submissions = repo.list_all_submissions(form.id).await?;

    let answers: Vec<serde_json::Value> = submissions.into_iter().map(|s| s.answers).collect();

    let start = std::time::Instant::now();
    let insights: Vec<FieldInsight> = fields
        .iter()
        .map(|field| {
            aggregate_field(
                &FieldSpec {
                    id: field.id,
                    key: &field.key,
                    label: &field.label,
                    field_type: &field.field_type,
                    options: field.options.as_ref(),
                },
                &answers,
            )
        })
        .collect();

    metrics::record_insights(start.elapsed().as_secs_f64(), insights.len());

    Ok(Json(InsightsResponse {
        form_id: form.id,
        submission_count: answers.len() as u64,
        fields: insights,
    }))
}

//! Submission intake and listing handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::AppState;
use formsmith_common::{
    auth::AuthContext,
    db::Repository,
    errors::{AppError, Result},
    metrics, RECENT_SUBMISSIONS_LIMIT,
};
use formsmith_core::{intake, RejectReason};

/// Public submission payload. Answers are stored verbatim; the
/// honeypot and render timestamp are screening signals only and are
/// never persisted.
#[derive(Debug, Deserialize)]
pub struct SubmitRequest {
    pub answers: serde_json::Value,

    #[serde(default)]
    pub metadata: Option<serde_json::Value>,

    #[serde(default)]
    pub honeypot: Option<String>,

    /// Client render timestamp, Unix millis
    #[serde(default)]
    pub started_at: Option<i64>,
}

#[derive(Serialize)]
pub struct SubmitResponse {
    pub id: Uuid,
    pub submitted_at: String,
}

#[derive(Serialize)]
pub struct SubmissionResponse {
    pub id: Uuid,
    pub answers: serde_json::Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
    pub submitted_at: String,
}

#[derive(Serialize)]
pub struct SubmissionListResponse {
    pub submissions: Vec<SubmissionResponse>,
    pub total: u64,
}

/// Generic rejection. Screening failures must be indistinguishable
/// from ordinary bad requests, so automated submitters get no signal
/// about which check tripped.
fn rejection() -> AppError {
    AppError::Validation {
        message: "Invalid submission data".to_string(),
        field: None,
    }
}

/// Accept a public submission addressed by form slug
pub async fn submit(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Json(request): Json<SubmitRequest>,
) -> Result<(StatusCode, Json<SubmitResponse>)> {
    let repo = Repository::new(state.db.clone());

    let form = repo
        .find_form_by_slug(&slug)
        .await?
        .ok_or_else(|| AppError::FormNotFound { id: slug.clone() })?;

    if !request.answers.is_object() {
        return Err(AppError::Validation {
            message: "answers must be a JSON object".to_string(),
            field: Some("answers".to_string()),
        });
    }

    let received_at = chrono::Utc::now().timestamp_millis();
    if let Err(reason) = intake::screen_submission(
        request.honeypot.as_deref(),
        request.started_at,
        received_at,
    ) {
        let label = match reason {
            RejectReason::HoneypotFilled => "honeypot",
            RejectReason::TooFast => "timing",
        };
        metrics::record_submission(false, label);
        tracing::warn!(form_id = %form.id, reason = label, "Submission rejected");
        return Err(rejection());
    }

    let submission = repo
        .create_submission(form.id, request.answers, request.metadata)
        .await?;

    metrics::record_submission(true, "");
    tracing::info!(
        submission_id = %submission.id,
        form_id = %form.id,
        "Submission stored"
    );

    Ok((
        StatusCode::CREATED,
        Json(SubmitResponse {
            id: submission.id,
            submitted_at: submission.submitted_at.to_rfc3339(),
        }),
    ))
}

/// List a form's most recent submissions, newest first
pub async fn list_submissions(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(form_id): Path<Uuid>,
) -> Result<Json<SubmissionListResponse>> {
    let repo = Repository::new(state.db.clone());

    let form = repo
        .find_form(auth.user_id, form_id)
        .await?
        .ok_or_else(|| AppError::FormNotFound {
            id: form_id.to_string(),
        })?;

    let total = repo.count_submissions(form.id).await?;
    let submissions = repo
        .list_recent_submissions(form.id, RECENT_SUBMISSIONS_LIMIT)
        .await?
        .into_iter()
        .map(|s| SubmissionResponse {
            id: s.id,
            answers: s.answers,
            metadata: s.metadata,
            submitted_at: s.submitted_at.to_rfc3339(),
        })
        .collect();

    Ok(Json(SubmissionListResponse { submissions, total }))
}

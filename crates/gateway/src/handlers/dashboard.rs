//! Dashboard overview handler
//!
//! One owner-wide snapshot for the landing view: all-time totals, a
//! last-7-days submission count, the latest submissions across every
//! form, and the busiest forms.

use axum::{extract::State, Json};
use chrono::{Duration, Utc};
use serde::Serialize;
use std::collections::HashMap;
use uuid::Uuid;

use crate::AppState;
use formsmith_common::{auth::AuthContext, db::Repository, errors::Result};

/// Recent-activity rows shown on the overview
pub const RECENT_ACTIVITY_LIMIT: u64 = 6;

/// Busiest forms shown on the overview
pub const TOP_FORMS_LIMIT: usize = 5;

#[derive(Serialize)]
pub struct DashboardTotals {
    pub projects: u64,
    pub forms: u64,
    pub submissions: u64,
    pub submissions_last_7_days: u64,
}

#[derive(Serialize)]
pub struct RecentSubmission {
    pub id: Uuid,
    pub form_id: Uuid,
    pub form_name: String,
    pub project_id: Uuid,
    pub submitted_at: String,
}

#[derive(Serialize)]
pub struct TopForm {
    pub id: Uuid,
    pub name: String,
    pub project_id: Uuid,
    pub submission_count: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_submission_at: Option<String>,
}

#[derive(Serialize)]
pub struct DashboardResponse {
    pub totals: DashboardTotals,
    pub recent_submissions: Vec<RecentSubmission>,
    pub top_forms: Vec<TopForm>,
}

/// Owner-wide overview stats
pub async fn overview(
    State(state): State<AppState>,
    auth: AuthContext,
) -> Result<Json<DashboardResponse>> {
    let repo = Repository::new(state.db.clone());

    let project_count = repo.count_projects(auth.user_id).await?;
    let forms = repo.list_owner_forms(auth.user_id).await?;
    let form_ids: Vec<Uuid> = forms.iter().map(|form| form.id).collect();

    let submission_count = repo.count_submissions_for_forms(&form_ids).await?;
    let cutoff = (Utc::now() - Duration::days(7)).into();
    let recent_count = repo
        .count_submissions_for_forms_since(&form_ids, cutoff)
        .await?;

    let forms_by_id: HashMap<Uuid, &formsmith_common::db::models::Form> =
        forms.iter().map(|form| (form.id, form)).collect();

    let recent_submissions = repo
        .list_recent_submissions_for_forms(&form_ids, RECENT_ACTIVITY_LIMIT)
        .await?
        .into_iter()
        .filter_map(|submission| {
            forms_by_id.get(&submission.form_id).map(|form| RecentSubmission {
                id: submission.id,
                form_id: form.id,
                form_name: form.name.clone(),
                project_id: form.project_id,
                submitted_at: submission.submitted_at.to_rfc3339(),
            })
        })
        .collect();

    let mut entries = Vec::with_capacity(forms.len());
    for form in &forms {
        let count = repo.count_submissions(form.id).await?;
        let last = repo.latest_submission_at(form.id).await?;
        entries.push(TopForm {
            id: form.id,
            name: form.name.clone(),
            project_id: form.project_id,
            submission_count: count,
            last_submission_at: last.map(|at| at.to_rfc3339()),
        });
    }

    Ok(Json(DashboardResponse {
        totals: DashboardTotals {
            projects: project_count,
            forms: form_ids.len() as u64,
            submissions: submission_count,
            submissions_last_7_days: recent_count,
        },
        recent_submissions,
        top_forms: rank_top_forms(entries),
    }))
}

/// Order forms by submission count, busiest first, keeping the input
/// order for ties, and keep only the top few.
fn rank_top_forms(mut entries: Vec<TopForm>) -> Vec<TopForm> {
    entries.sort_by(|a, b| b.submission_count.cmp(&a.submission_count));
    entries.truncate(TOP_FORMS_LIMIT);
    entries
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str, submission_count: u64) -> TopForm {
        TopForm {
            id: Uuid::new_v4(),
            name: name.to_string(),
            project_id: Uuid::new_v4(),
            submission_count,
            last_submission_at: None,
        }
    }

    #[test]
    fn test_top_forms_ordered_by_count() {
        let ranked = rank_top_forms(vec![entry("a", 2), entry("b", 9), entry("c", 5)]);
        let names: Vec<&str> = ranked.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["b", "c", "a"]);
    }

    #[test]
    fn test_top_forms_truncated() {
        let entries = (0..8u64).map(|i| entry("f", i)).collect();
        assert_eq!(rank_top_forms(entries).len(), TOP_FORMS_LIMIT);
    }

    #[test]
    fn test_top_forms_ties_keep_input_order() {
        let ranked = rank_top_forms(vec![entry("first", 3), entry("second", 3)]);
        let names: Vec<&str> = ranked.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["first", "second"]);
    }
}

//! Repository pattern for database operations
//!
//! Provides a clean interface for all data access operations with
//! proper error handling and transaction support. Every dashboard
//! operation takes the caller's owner id and scopes lookups by it;
//! an ownership miss surfaces as not-found so existence is never
//! leaked across tenants.

use crate::db::models::*;
use crate::db::DbPool;
use crate::errors::{AppError, Result};
use formsmith_core::{ordering, slug};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};
use uuid::Uuid;

/// Patch applied to an existing field. `None` leaves the column
/// untouched; `Some` overwrites it (including with JSON null).
#[derive(Debug, Default, Clone)]
pub struct FieldPatch {
    pub label: Option<String>,
    pub field_type: Option<String>,
    pub required: Option<bool>,
    pub options: Option<serde_json::Value>,
    pub config: Option<serde_json::Value>,
}

/// Repository for data access operations
#[derive(Clone)]
pub struct Repository {
    pool: DbPool,
}

impl Repository {
    /// Create a new repository with the given connection pool
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Get the read connection
    fn read_conn(&self) -> &DatabaseConnection {
        self.pool.read()
    }

    /// Get the write connection
    fn write_conn(&self) -> &DatabaseConnection {
        self.pool.write()
    }

    // ========================================================================
    // Health Check
    // ========================================================================

    /// Ping the database
    pub async fn ping(&self) -> Result<()> {
        self.pool.ping().await
    }

    // ========================================================================
    // Project Operations
    // ========================================================================

    /// Create a new project owned by the caller
    pub async fn create_project(&self, owner_id: Uuid, name: String) -> Result<Project> {
        let now = chrono::Utc::now();

        let project = ProjectActiveModel {
            id: Set(Uuid::new_v4()),
            owner_id: Set(owner_id),
            name: Set(name),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };

        project.insert(self.write_conn()).await.map_err(Into::into)
    }

    /// List the caller's projects, newest first
    pub async fn list_projects(&self, owner_id: Uuid) -> Result<Vec<Project>> {
        ProjectEntity::find()
            .filter(ProjectColumn::OwnerId.eq(owner_id))
            .order_by_desc(ProjectColumn::CreatedAt)
            .all(self.read_conn())
            .await
            .map_err(Into::into)
    }

    /// Find a project by ID, scoped to its owner
    pub async fn find_project(&self, owner_id: Uuid, id: Uuid) -> Result<Option<Project>> {
        ProjectEntity::find_by_id(id)
            .filter(ProjectColumn::OwnerId.eq(owner_id))
            .one(self.read_conn())
            .await
            .map_err(Into::into)
    }

    /// Rename a project
    pub async fn rename_project(&self, owner_id: Uuid, id: Uuid, name: String) -> Result<Project> {
        let mut project: ProjectActiveModel = self
            .find_project(owner_id, id)
            .await?
            .ok_or_else(|| AppError::ProjectNotFound { id: id.to_string() })?
            .into();

        project.name = Set(name);
        project.updated_at = Set(chrono::Utc::now().into());

        project.update(self.write_conn()).await.map_err(Into::into)
    }

    /// Delete a project and everything under it (forms, fields,
    /// submissions) in one transaction
    pub async fn delete_project(&self, owner_id: Uuid, id: Uuid) -> Result<()> {
        let project = self
            .find_project(owner_id, id)
            .await?
            .ok_or_else(|| AppError::ProjectNotFound { id: id.to_string() })?;

        let form_ids: Vec<Uuid> = FormEntity::find()
            .filter(FormColumn::ProjectId.eq(project.id))
            .all(self.read_conn())
            .await?
            .into_iter()
            .map(|form| form.id)
            .collect();

        let txn = self.write_conn().begin().await?;

        if !form_ids.is_empty() {
            SubmissionEntity::delete_many()
                .filter(SubmissionColumn::FormId.is_in(form_ids.clone()))
                .exec(&txn)
                .await?;

            FieldEntity::delete_many()
                .filter(FieldColumn::FormId.is_in(form_ids.clone()))
                .exec(&txn)
                .await?;

            FormEntity::delete_many()
                .filter(FormColumn::ProjectId.eq(project.id))
                .exec(&txn)
                .await?;
        }

        ProjectEntity::delete_by_id(project.id).exec(&txn).await?;

        txn.commit().await?;
        Ok(())
    }

    /// Count forms within a project
    pub async fn count_forms(&self, project_id: Uuid) -> Result<u64> {
        FormEntity::find()
            .filter(FormColumn::ProjectId.eq(project_id))
            .count(self.read_conn())
            .await
            .map_err(Into::into)
    }

    // ========================================================================
    // Form Operations
    // ========================================================================

    /// Create a form in one of the caller's projects. The public slug
    /// is derived from the name; a collision (or an unnameable form)
    /// gets a base36 timestamp suffix.
    pub async fn create_form(
        &self,
        owner_id: Uuid,
        project_id: Uuid,
        name: String,
    ) -> Result<Form> {
        self.find_project(owner_id, project_id)
            .await?
            .ok_or_else(|| AppError::ProjectNotFound {
                id: project_id.to_string(),
            })?;

        let now = chrono::Utc::now();
        let suffix = slug::base36_suffix(now.timestamp_millis());

        let base_slug = {
            let derived = slug::form_slug(&name);
            if derived.is_empty() {
                format!("form-{}", suffix)
            } else {
                derived
            }
        };

        let slug = if self.find_form_by_slug(&base_slug).await?.is_some() {
            format!("{}-{}", base_slug, suffix)
        } else {
            base_slug
        };

        let form = FormActiveModel {
            id: Set(Uuid::new_v4()),
            project_id: Set(project_id),
            name: Set(name),
            slug: Set(slug),
            fields_version: Set(0),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };

        form.insert(self.write_conn()).await.map_err(Into::into)
    }

    /// Find a form by ID, scoped to its owner
    pub async fn find_form(&self, owner_id: Uuid, id: Uuid) -> Result<Option<Form>> {
        let Some(form) = FormEntity::find_by_id(id).one(self.read_conn()).await? else {
            return Ok(None);
        };

        // Ownership check goes through the parent project
        let owned = self.find_project(owner_id, form.project_id).await?.is_some();
        Ok(owned.then_some(form))
    }

    /// Find a form by its public slug (unauthenticated intake path)
    pub async fn find_form_by_slug(&self, slug: &str) -> Result<Option<Form>> {
        FormEntity::find()
            .filter(FormColumn::Slug.eq(slug))
            .one(self.read_conn())
            .await
            .map_err(Into::into)
    }

    /// Rename a form. The slug is fixed at creation time and survives
    /// renames so published links keep working.
    pub async fn rename_form(&self, owner_id: Uuid, id: Uuid, name: String) -> Result<Form> {
        let mut form: FormActiveModel = self
            .require_form(owner_id, id)
            .await?
            .into();

        form.name = Set(name);
        form.updated_at = Set(chrono::Utc::now().into());

        form.update(self.write_conn()).await.map_err(Into::into)
    }

    /// Delete a form with its fields and submissions in one transaction
    pub async fn delete_form(&self, owner_id: Uuid, id: Uuid) -> Result<()> {
        let form = self.require_form(owner_id, id).await?;

        let txn = self.write_conn().begin().await?;

        SubmissionEntity::delete_many()
            .filter(SubmissionColumn::FormId.eq(form.id))
            .exec(&txn)
            .await?;

        FieldEntity::delete_many()
            .filter(FieldColumn::FormId.eq(form.id))
            .exec(&txn)
            .await?;

        FormEntity::delete_by_id(form.id).exec(&txn).await?;

        txn.commit().await?;
        Ok(())
    }

    async fn require_form(&self, owner_id: Uuid, id: Uuid) -> Result<Form> {
        self.find_form(owner_id, id)
            .await?
            .ok_or_else(|| AppError::FormNotFound { id: id.to_string() })
    }

    // ========================================================================
    // Field Operations
    // ========================================================================

    /// List a form's fields in question order
    pub async fn list_fields(&self, form_id: Uuid) -> Result<Vec<Field>> {
        FieldEntity::find()
            .filter(FieldColumn::FormId.eq(form_id))
            .order_by_asc(FieldColumn::OrderIndex)
            .all(self.read_conn())
            .await
            .map_err(Into::into)
    }

    /// Create a field at the end of the form's question sequence
    #[allow(clippy::too_many_arguments)]
    pub async fn create_field(
        &self,
        owner_id: Uuid,
        form_id: Uuid,
        key: String,
        label: String,
        field_type: String,
        required: bool,
        options: Option<serde_json::Value>,
        config: Option<serde_json::Value>,
    ) -> Result<Field> {
        let form = self.require_form(owner_id, form_id).await?;

        let duplicate = FieldEntity::find()
            .filter(FieldColumn::FormId.eq(form.id))
            .filter(FieldColumn::Key.eq(key.clone()))
            .one(self.read_conn())
            .await?;

        if duplicate.is_some() {
            return Err(AppError::DuplicateFieldKey { key });
        }

        // New fields always append
        let order_index = FieldEntity::find()
            .filter(FieldColumn::FormId.eq(form.id))
            .count(self.read_conn())
            .await? as i32;

        let now = chrono::Utc::now();
        let field = FieldActiveModel {
            id: Set(Uuid::new_v4()),
            form_id: Set(form.id),
            key: Set(key),
            label: Set(label),
            field_type: Set(field_type),
            required: Set(required),
            order_index: Set(order_index),
            options: Set(options),
            config: Set(config),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };

        field.insert(self.write_conn()).await.map_err(Into::into)
    }

    /// Update a field's label, type, required flag, or configuration
    pub async fn update_field(
        &self,
        owner_id: Uuid,
        form_id: Uuid,
        field_id: Uuid,
        patch: FieldPatch,
    ) -> Result<Field> {
        self.require_form(owner_id, form_id).await?;

        let mut field: FieldActiveModel = FieldEntity::find_by_id(field_id)
            .filter(FieldColumn::FormId.eq(form_id))
            .one(self.read_conn())
            .await?
            .ok_or_else(|| AppError::FieldNotFound {
                id: field_id.to_string(),
            })?
            .into();

        if let Some(label) = patch.label {
            field.label = Set(label);
        }
        if let Some(field_type) = patch.field_type {
            field.field_type = Set(field_type);
        }
        if let Some(required) = patch.required {
            field.required = Set(required);
        }
        if let Some(options) = patch.options {
            field.options = Set(Some(options));
        }
        if let Some(config) = patch.config {
            field.config = Set(Some(config));
        }
        field.updated_at = Set(chrono::Utc::now().into());

        field.update(self.write_conn()).await.map_err(Into::into)
    }

    /// Delete a field and eagerly resequence the survivors so stored
    /// order positions stay contiguous
    pub async fn delete_field(&self, owner_id: Uuid, form_id: Uuid, field_id: Uuid) -> Result<()> {
        self.require_form(owner_id, form_id).await?;

        let field = FieldEntity::find_by_id(field_id)
            .filter(FieldColumn::FormId.eq(form_id))
            .one(self.read_conn())
            .await?
            .ok_or_else(|| AppError::FieldNotFound {
                id: field_id.to_string(),
            })?;

        let remaining: Vec<Field> = self
            .list_fields(form_id)
            .await?
            .into_iter()
            .filter(|f| f.id != field.id)
            .collect();

        let txn = self.write_conn().begin().await?;

        FieldEntity::delete_by_id(field.id).exec(&txn).await?;

        for (survivor, position) in ordering::resequence(remaining) {
            if survivor.order_index != position {
                let mut survivor: FieldActiveModel = survivor.into();
                survivor.order_index = Set(position);
                survivor.update(&txn).await?;
            }
        }

        txn.commit().await?;
        Ok(())
    }

    /// Apply a move instruction to a form's fields and persist the
    /// recomputed contiguous order positions.
    ///
    /// `expected_version` must match the form's current
    /// `fields_version`; a stale value means another reorder landed
    /// first and the request is rejected with a conflict.
    pub async fn reorder_fields(
        &self,
        owner_id: Uuid,
        form_id: Uuid,
        source_id: Uuid,
        target_id: Uuid,
        expected_version: i32,
    ) -> Result<(Vec<Field>, i32)> {
        let form = self.require_form(owner_id, form_id).await?;

        if form.fields_version != expected_version {
            return Err(AppError::ReorderConflict {
                expected: expected_version,
                actual: form.fields_version,
            });
        }

        let fields = self.list_fields(form_id).await?;
        let moved = ordering::move_by_key(fields, &source_id, &target_id, |field| field.id);
        let sequenced = ordering::resequence(moved);

        // A no-op move (source == target, or unknown ids) must not
        // consume the version, or other editors' tokens go stale for
        // nothing.
        if sequenced
            .iter()
            .all(|(field, position)| field.order_index == *position)
        {
            let unchanged = sequenced.into_iter().map(|(field, _)| field).collect();
            return Ok((unchanged, form.fields_version));
        }

        let new_version = form.fields_version + 1;
        let txn = self.write_conn().begin().await?;

        let mut result = Vec::with_capacity(sequenced.len());
        for (field, position) in sequenced {
            if field.order_index != position {
                let mut active: FieldActiveModel = field.into();
                active.order_index = Set(position);
                result.push(active.update(&txn).await?);
            } else {
                result.push(field);
            }
        }

        let mut form: FormActiveModel = form.into();
        form.fields_version = Set(new_version);
        form.updated_at = Set(chrono::Utc::now().into());
        form.update(&txn).await?;

        txn.commit().await?;
        Ok((result, new_version))
    }

    // ========================================================================
    // Dashboard Operations
    // ========================================================================

    /// Count the caller's projects
    pub async fn count_projects(&self, owner_id: Uuid) -> Result<u64> {
        ProjectEntity::find()
            .filter(ProjectColumn::OwnerId.eq(owner_id))
            .count(self.read_conn())
            .await
            .map_err(Into::into)
    }

    /// Every form across all of the caller's projects
    pub async fn list_owner_forms(&self, owner_id: Uuid) -> Result<Vec<Form>> {
        let project_ids: Vec<Uuid> = self
            .list_projects(owner_id)
            .await?
            .into_iter()
            .map(|project| project.id)
            .collect();

        if project_ids.is_empty() {
            return Ok(Vec::new());
        }

        FormEntity::find()
            .filter(FormColumn::ProjectId.is_in(project_ids))
            .all(self.read_conn())
            .await
            .map_err(Into::into)
    }

    /// Count submissions across a set of forms
    pub async fn count_submissions_for_forms(&self, form_ids: &[Uuid]) -> Result<u64> {
        if form_ids.is_empty() {
            return Ok(0);
        }

        SubmissionEntity::find()
            .filter(SubmissionColumn::FormId.is_in(form_ids.to_vec()))
            .count(self.read_conn())
            .await
            .map_err(Into::into)
    }

    /// Count submissions across a set of forms received at or after
    /// `cutoff`
    pub async fn count_submissions_for_forms_since(
        &self,
        form_ids: &[Uuid],
        cutoff: chrono::DateTime<chrono::FixedOffset>,
    ) -> Result<u64> {
        if form_ids.is_empty() {
            return Ok(0);
        }

        SubmissionEntity::find()
            .filter(SubmissionColumn::FormId.is_in(form_ids.to_vec()))
            .filter(SubmissionColumn::SubmittedAt.gte(cutoff))
            .count(self.read_conn())
            .await
            .map_err(Into::into)
    }

    /// Most recent submissions across a set of forms, newest first
    pub async fn list_recent_submissions_for_forms(
        &self,
        form_ids: &[Uuid],
        limit: u64,
    ) -> Result<Vec<Submission>> {
        use sea_orm::QuerySelect;

        if form_ids.is_empty() {
            return Ok(Vec::new());
        }

        SubmissionEntity::find()
            .filter(SubmissionColumn::FormId.is_in(form_ids.to_vec()))
            .order_by_desc(SubmissionColumn::SubmittedAt)
            .limit(limit)
            .all(self.read_conn())
            .await
            .map_err(Into::into)
    }

    /// Timestamp of a form's most recent submission, if any
    pub async fn latest_submission_at(
        &self,
        form_id: Uuid,
    ) -> Result<Option<chrono::DateTime<chrono::FixedOffset>>> {
        let latest = SubmissionEntity::find()
            .filter(SubmissionColumn::FormId.eq(form_id))
            .order_by_desc(SubmissionColumn::SubmittedAt)
            .one(self.read_conn())
            .await?;

        Ok(latest.map(|submission| submission.submitted_at))
    }

    // ========================================================================
    // Submission Operations
    // ========================================================================

    /// Persist one submission verbatim
    pub async fn create_submission(
        &self,
        form_id: Uuid,
        answers: serde_json::Value,
        metadata: Option<serde_json::Value>,
    ) -> Result<Submission> {
        let submission = SubmissionActiveModel {
            id: Set(Uuid::new_v4()),
            form_id: Set(form_id),
            answers: Set(answers),
            metadata: Set(metadata),
            submitted_at: Set(chrono::Utc::now().into()),
        };

        submission
            .insert(self.write_conn())
            .await
            .map_err(Into::into)
    }

    /// Most recent submissions for a form, newest first
    pub async fn list_recent_submissions(
        &self,
        form_id: Uuid,
        limit: u64,
    ) -> Result<Vec<Submission>> {
        use sea_orm::QuerySelect;

        SubmissionEntity::find()
            .filter(SubmissionColumn::FormId.eq(form_id))
            .order_by_desc(SubmissionColumn::SubmittedAt)
            .limit(limit)
            .all(self.read_conn())
            .await
            .map_err(Into::into)
    }

    /// Full submission history for a form, newest first. Aggregation
    /// recomputes from the complete history on every request.
    pub async fn list_all_submissions(&self, form_id: Uuid) -> Result<Vec<Submission>> {
        SubmissionEntity::find()
            .filter(SubmissionColumn::FormId.eq(form_id))
            .order_by_desc(SubmissionColumn::SubmittedAt)
            .all(self.read_conn())
            .await
            .map_err(Into::into)
    }

    /// Count all submissions for a form
    pub async fn count_submissions(&self, form_id: Uuid) -> Result<u64> {
        SubmissionEntity::find()
            .filter(SubmissionColumn::FormId.eq(form_id))
            .count(self.read_conn())
            .await
            .map_err(Into::into)
    }
}

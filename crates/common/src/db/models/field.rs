//! Field entity
//!
//! One question within a form. `order_index` values within a form are
//! kept contiguous (0..N) by the repository's reorder and delete paths.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "fields")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub form_id: Uuid,

    /// Machine-safe answer key, unique within the form
    #[sea_orm(column_type = "Text")]
    pub key: String,

    #[sea_orm(column_type = "Text")]
    pub label: String,

    /// Type tag: text, textarea, email, number, checkbox, select
    #[sea_orm(column_type = "Text")]
    pub field_type: String,

    pub required: bool,

    /// Zero-based position within the form's question sequence
    pub order_index: i32,

    /// Type-specific configuration (e.g. the select option list)
    #[sea_orm(column_type = "JsonBinary", nullable)]
    pub options: Option<Json>,

    #[sea_orm(column_type = "JsonBinary", nullable)]
    pub config: Option<Json>,

    pub created_at: DateTimeWithTimeZone,

    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::form::Entity",
        from = "Column::FormId",
        to = "super::form::Column::Id"
    )]
    Form,
}

impl Related<super::form::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Form.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

//! SeaORM entity models
//!
//! Database entities for Formsmith

mod field;
mod form;
mod project;
mod submission;

pub use project::{
    ActiveModel as ProjectActiveModel, Column as ProjectColumn, Entity as ProjectEntity,
    Model as Project,
};

pub use form::{
    ActiveModel as FormActiveModel, Column as FormColumn, Entity as FormEntity, Model as Form,
};

pub use field::{
    ActiveModel as FieldActiveModel, Column as FieldColumn, Entity as FieldEntity,
    Model as Field,
};

pub use submission::{
    ActiveModel as SubmissionActiveModel, Column as SubmissionColumn,
    Entity as SubmissionEntity, Model as Submission,
};

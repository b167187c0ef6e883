//! Formsmith domain logic
//!
//! Pure, synchronous computations shared by the service crates:
//! - Slug and field-key derivation
//! - Field ordering (move + resequence)
//! - Response aggregation into per-field insights
//! - Submission intake screening (honeypot, fill time)
//!
//! Nothing in this crate performs I/O or holds state between calls;
//! every operation is a total function over its inputs.

pub mod insights;
pub mod intake;
pub mod ordering;
pub mod slug;

pub use insights::{aggregate_field, BreakdownBucket, FieldInsight, FieldKind, FieldSpec};
pub use intake::{screen_submission, RejectReason, MIN_FILL_TIME_MS};
pub use ordering::{move_by_key, resequence};
pub use slug::{field_key, form_slug};

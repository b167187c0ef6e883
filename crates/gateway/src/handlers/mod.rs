//! API handlers module

pub mod dashboard;
pub mod fields;
pub mod forms;
pub mod health;
pub mod insights;
pub mod projects;
pub mod submissions;

//! Formsmith common library
//!
//! Shared code for the Formsmith services:
//! - Database entities and the repository pattern
//! - Error types and handling
//! - Configuration management
//! - Authentication utilities
//! - Metrics and observability

pub mod auth;
pub mod config;
pub mod db;
pub mod errors;
pub mod metrics;

// Re-export commonly used types
pub use config::AppConfig;
pub use db::{DbPool, Repository};
pub use errors::{AppError, Result};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Dashboard submission listings return at most this many rows.
pub const RECENT_SUBMISSIONS_LIMIT: u64 = 50;

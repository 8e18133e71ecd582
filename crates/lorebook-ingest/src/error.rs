//! Error types for the ingestion pipeline.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for ingestion operations.
pub type IngestResult<T> = Result<T, IngestError>;

/// Errors that abort an ingestion run.
///
/// Malformed input never surfaces here; it is skipped and counted in the
/// run report instead.
#[derive(Error, Debug)]
pub enum IngestError {
    #[error("Database error: {0}")]
    Database(#[from] lorebook_db::DbError),

    #[error("Root directory not found: {0}")]
    RootNotFound(PathBuf),
}

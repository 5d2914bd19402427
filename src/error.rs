use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use crate::models::posting::{ParseEnumError, PostingError};
use crate::notify::NotifyError;

/// Storage-layer failures.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Corrupt row: {0}")]
    Corrupt(#[from] ParseEnumError),
}

impl StoreError {
    /// A unique-key race lost to a concurrent writer of the same url.
    pub fn is_conflict(&self) -> bool {
        matches!(self, StoreError::Database(sqlx::Error::Database(db_err)) if db_err.is_unique_violation())
    }
}

/// Site adapter configuration that cannot be compiled.
#[derive(Debug, thiserror::Error)]
pub enum AdapterError {
    #[error("site '{site}': invalid selector '{selector}': {reason}")]
    Selector {
        site: String,
        selector: String,
        reason: String,
    },

    #[error("site '{site}': invalid pattern '{pattern}': {source}")]
    Pattern {
        site: String,
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("site '{site}': {reason}")]
    Invalid { site: String, reason: String },

    #[error("failed to read site file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse site file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Everything that can go wrong while turning one candidate into a record.
///
/// Fetch failures never appear here: a missing page degrades to card fields.
/// `ExtractionMiss` drops a single card and `Notification` only skips the
/// announcement.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("no strategy produced an acceptable {field}")]
    ExtractionMiss { field: &'static str },

    #[error("concurrent upsert conflict on {url}")]
    StorageConflict { url: String },

    #[error("notification failed: {0}")]
    Notification(#[from] NotifyError),

    #[error("storage failed: {0}")]
    Storage(#[from] StoreError),

    #[error("invalid posting: {0}")]
    InvalidPosting(#[from] PostingError),

    #[error("unexpected failure: {0}")]
    Unexpected(String),
}

impl PipelineError {
    /// Short stable name used as a structured log field.
    pub fn kind(&self) -> &'static str {
        match self {
            PipelineError::ExtractionMiss { .. } => "extraction_miss",
            PipelineError::StorageConflict { .. } => "storage_conflict",
            PipelineError::Notification(_) => "notification_failure",
            PipelineError::Storage(_) => "storage",
            PipelineError::InvalidPosting(_) => "invalid_posting",
            PipelineError::Unexpected(_) => "unexpected",
        }
    }
}

/// Errors returned by the query API.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    #[error("Not found: {0}")]
    NotFound(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::Store(e) => {
                tracing::error!("Storage error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
        };

        let body = axum::Json(json!({ "error": message }));
        (status, body).into_response()
    }
}

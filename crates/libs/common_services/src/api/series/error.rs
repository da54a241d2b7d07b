use crate::database::DbError;
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use color_eyre::eyre;
use serde_json::json;
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum SeriesError {
    #[error("permission denied")]
    PermissionDenied,

    #[error("{}", .0.join("; "))]
    Validation(Vec<String>),

    #[error("series not found: {0}")]
    NotFound(String),

    #[error("post not found: {0}")]
    PostNotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(DbError),

    /// At least one update of a reorder batch failed. Others may have been applied.
    #[error("failed to update series order: {0}")]
    OrderUpdateFailed(DbError),

    #[error("internal error")]
    Internal(#[from] eyre::Report),
}

fn log_error(error: &SeriesError) {
    match error {
        SeriesError::Database(e) => warn!("Series -> database query failed: {}", e),
        SeriesError::OrderUpdateFailed(e) => warn!("Series -> order batch failed: {}", e),
        SeriesError::Internal(e) => warn!("Series -> internal error: {:?}", e),
        other => warn!("Series -> {}", other),
    }
}

impl IntoResponse for SeriesError {
    fn into_response(self) -> Response {
        log_error(&self);

        let (status, error_message) = match self {
            Self::PermissionDenied => (StatusCode::FORBIDDEN, self.to_string()),
            Self::Validation(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            Self::NotFound(_) | Self::PostNotFound(_) => (StatusCode::NOT_FOUND, self.to_string()),
            Self::Conflict(message) => (StatusCode::CONFLICT, message),
            Self::Database(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "A database error occurred.".to_string(),
            ),
            Self::OrderUpdateFailed(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to update series order.".to_string(),
            ),
            Self::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "An unexpected internal error occurred.".to_string(),
            ),
        };

        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}

impl From<DbError> for SeriesError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::UniqueViolation { constraint } => Self::Conflict(match constraint.as_str() {
                "series_title_key" => "a series with this title already exists".to_owned(),
                "series_slug_key" => "a series with this slug already exists".to_owned(),
                _ => "series already exists".to_owned(),
            }),
            other => Self::Database(other),
        }
    }
}

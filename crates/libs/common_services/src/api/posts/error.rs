use crate::database::DbError;
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum PostError {
    #[error("permission denied")]
    PermissionDenied,

    #[error("{}", .0.join("; "))]
    Validation(Vec<String>),

    #[error("post not found: {0}")]
    NotFound(String),

    #[error("a post with this slug already exists")]
    Conflict,

    #[error("Database error: {0}")]
    Database(DbError),
}

impl IntoResponse for PostError {
    fn into_response(self) -> Response {
        warn!("Post -> {}", self);

        let status = match self {
            Self::PermissionDenied => StatusCode::FORBIDDEN,
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict => StatusCode::CONFLICT,
            Self::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let error_message = match self {
            Self::Database(_) => "A database error occurred.".to_string(),
            other => other.to_string(),
        };

        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}

impl From<DbError> for PostError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::UniqueViolation { .. } => Self::Conflict,
            other => Self::Database(other),
        }
    }
}

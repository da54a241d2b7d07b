use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use color_eyre::eyre;
use serde_json::json;
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Malformed authorization header")]
    MalformedHeader,

    #[error("Invalid token")]
    InvalidToken,

    #[error("internal error")]
    Internal(#[from] eyre::Report),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            Self::MalformedHeader => (StatusCode::UNAUTHORIZED, "malformed authorization header"),
            Self::InvalidToken => (StatusCode::UNAUTHORIZED, "invalid token"),
            Self::Internal(e) => {
                warn!("Auth internal error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An unexpected internal error occurred.",
                )
            }
        };
        if status == StatusCode::UNAUTHORIZED {
            warn!("Rejected request: {}", self);
        }

        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}

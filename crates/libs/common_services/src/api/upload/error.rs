use crate::api::upload::interfaces::MAX_UPLOAD_SIZE_MIB;
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use color_eyre::eyre;
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("permission denied")]
    PermissionDenied,

    #[error("no file selected")]
    NoFile,

    #[error("file size exceeds the {} MiB limit", MAX_UPLOAD_SIZE_MIB)]
    TooLarge,

    #[error("invalid upload form: {0}")]
    InvalidForm(String),

    #[error("upload failed: {0:#}")]
    Failed(eyre::Report),
}

fn log_error(error: &UploadError) {
    match error {
        UploadError::Failed(e) => error!("Upload failed: {:?}", e),
        other => warn!("Upload rejected: {}", other),
    }
}

impl IntoResponse for UploadError {
    fn into_response(self) -> Response {
        log_error(&self);

        let status = match &self {
            Self::PermissionDenied => StatusCode::FORBIDDEN,
            Self::NoFile | Self::InvalidForm(_) => StatusCode::BAD_REQUEST,
            Self::TooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Failed(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

use app_state::{AppSettings, UploadSettings};
use axum::body::Bytes;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub const MAX_UPLOAD_SIZE_MIB: usize = 10;
/// Upper bound for a single uploaded file, enforced by the HTTP layer and again by the pipeline.
pub const MAX_UPLOAD_SIZE_BYTES: usize = MAX_UPLOAD_SIZE_MIB * 1024 * 1024;
/// Number of leading bytes read to classify a stored file.
pub const SIGNATURE_PROBE_LEN: usize = 64;
/// Length of the random id inserted into stored file names.
pub const FILE_ID_LENGTH: usize = 24;

/// A file received from a client.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    /// Name as sent by the client, may contain path components.
    pub file_name: String,
    pub bytes: Bytes,
}

/// Where uploads go and whether they are relayed to object storage.
#[derive(Debug, Clone)]
pub struct UploadConfig {
    pub upload: UploadSettings,
    pub production: bool,
    pub key_prefix: String,
}

impl UploadConfig {
    #[must_use]
    pub fn from_settings(settings: &AppSettings) -> Self {
        Self {
            upload: settings.upload.clone(),
            production: settings.deployment.is_production(),
            key_prefix: settings.object_storage.key_prefix.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UploadResponse {
    pub url: String,
}

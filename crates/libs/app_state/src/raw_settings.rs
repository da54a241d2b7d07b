use serde::Deserialize;
use std::path::PathBuf;

/// Settings exactly as they appear in `config/settings.yaml` (plus `APP__` env overrides).
#[derive(Debug, Deserialize, Clone)]
pub struct RawSettings {
    pub api: ApiSettings,
    pub logging: LoggingSettings,
    pub upload: RawUploadSettings,
    pub object_storage: ObjectStorageSettings,
    pub deployment: DeploymentSettings,
    pub database: DatabaseSettings,
    pub secrets: SecretSettings,
}

/// Configuration for the API server.
#[derive(Debug, Deserialize, Clone)]
pub struct ApiSettings {
    pub host: String,
    pub port: u16,
    pub allowed_origins: Vec<String>,
    pub public_url: String,
}

/// Logging configuration, used when `RUST_LOG` is not set.
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingSettings {
    pub level: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RawUploadSettings {
    /// Folder served as static files by the API; uploads live in a subdirectory of it.
    pub public_folder: PathBuf,
    /// Name of the upload subdirectory, also used as the URL prefix for local uploads.
    pub upload_dir_name: String,
}

/// S3-compatible object storage used for durable uploads in production.
#[derive(Debug, Deserialize, Clone)]
pub struct ObjectStorageSettings {
    pub bucket: String,
    pub region: String,
    pub endpoint: String,
    /// Every uploaded object key is `{key_prefix}/{file_name}`.
    pub key_prefix: String,
    /// Public base URL (e.g. a CDN cname). Falls back to the bucket URL when absent.
    pub public_base_url: Option<String>,
    #[serde(default)]
    pub path_style: bool,
}

#[derive(Debug, Deserialize, Clone, Copy)]
pub struct DeploymentSettings {
    /// Production-like deployments relay uploads to object storage.
    pub production: bool,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseBackend {
    Postgres,
    Memory,
}

/// Database connection and related configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseSettings {
    pub backend: DatabaseBackend,
    pub max_connections: u32,
    pub min_connections: u32,
    pub max_lifetime: u64,
    pub idle_timeout: u64,
    pub acquire_timeout: u64,
    /// Length of generated `id` for series and posts.
    pub id_length: usize,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SecretSettings {
    pub database_url: String,
    /// Bearer token that grants write permission.
    pub admin_token: String,
    pub storage_access_key: String,
    pub storage_secret_key: String,
}

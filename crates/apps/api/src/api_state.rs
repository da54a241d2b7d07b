use app_state::{AppSettings, DatabaseBackend};
use axum::extract::FromRef;
use color_eyre::Result;
use common_services::api::upload::interfaces::UploadConfig;
use common_services::database::{Stores, get_db_pool};
use common_services::object_storage::{ObjectStorage, S3ObjectStorage};
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Clone)]
pub struct ApiContext {
    pub stores: Stores,
    pub object_storage: Arc<dyn ObjectStorage>,
    pub upload: UploadConfig,
    /// Bearer token that identifies the admin.
    pub admin_token: Arc<str>,
    /// Length of generated series and post ids.
    pub id_length: usize,
}

impl ApiContext {
    /// Connects the configured store backend and object storage.
    pub async fn from_settings(settings: &AppSettings) -> Result<Self> {
        let stores = match settings.database.backend {
            DatabaseBackend::Postgres => {
                let pool = get_db_pool(&settings.secrets.database_url, &settings.database).await?;
                Stores::postgres(pool)
            }
            DatabaseBackend::Memory => {
                warn!("Using the in-memory store, nothing will be persisted.");
                Stores::in_memory()
            }
        };
        let object_storage =
            S3ObjectStorage::new(&settings.object_storage, &settings.secrets)?;
        info!(
            "Object storage bucket: {} (relay {})",
            settings.object_storage.bucket,
            if settings.deployment.is_production() {
                "enabled"
            } else {
                "disabled"
            }
        );

        Ok(Self {
            stores,
            object_storage: Arc::new(object_storage),
            upload: UploadConfig::from_settings(settings),
            admin_token: Arc::from(settings.secrets.admin_token.as_str()),
            id_length: settings.database.id_length,
        })
    }
}

impl FromRef<ApiContext> for Stores {
    fn from_ref(state: &ApiContext) -> Self {
        state.stores.clone()
    }
}

impl FromRef<ApiContext> for UploadConfig {
    fn from_ref(state: &ApiContext) -> Self {
        state.upload.clone()
    }
}

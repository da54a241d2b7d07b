use crate::{
    ApiSettings, DatabaseSettings, DeploymentSettings, LoggingSettings, ObjectStorageSettings,
    RawSettings, SecretSettings,
};
use color_eyre::eyre::{Context, bail};
use serde::Deserialize;
use std::path::{PathBuf, absolute};

#[derive(Debug, Deserialize, Clone)]
pub struct AppSettings {
    pub api: ApiSettings,
    pub logging: LoggingSettings,
    pub upload: UploadSettings,
    pub object_storage: ObjectStorageSettings,
    pub deployment: DeploymentSettings,
    pub database: DatabaseSettings,
    pub secrets: SecretSettings,
}

/// Resolved upload locations.
#[derive(Debug, Deserialize, Clone)]
pub struct UploadSettings {
    pub public_folder: PathBuf,
    pub upload_dir_name: String,
    /// `public_folder/upload_dir_name`, absolute.
    pub upload_dir: PathBuf,
}

impl TryFrom<RawSettings> for AppSettings {
    type Error = color_eyre::Report;

    fn try_from(raw: RawSettings) -> Result<Self, Self::Error> {
        let dir_name = raw.upload.upload_dir_name.trim_matches('/').to_owned();
        if dir_name.is_empty() || dir_name.contains(['/', '\\']) || dir_name == ".." {
            bail!("Invalid upload_dir_name: {:?}", raw.upload.upload_dir_name);
        }
        let public_folder =
            absolute(&raw.upload.public_folder).wrap_err("Invalid upload public_folder")?;
        let upload = UploadSettings {
            upload_dir: public_folder.join(&dir_name),
            public_folder,
            upload_dir_name: dir_name,
        };

        Ok(Self {
            api: raw.api,
            logging: raw.logging,
            upload,
            object_storage: raw.object_storage,
            deployment: raw.deployment,
            database: raw.database,
            secrets: raw.secrets,
        })
    }
}

impl UploadSettings {
    /// Builds settings rooted at `public_folder`, mostly useful for tests and tools.
    #[must_use]
    pub fn new(public_folder: PathBuf, upload_dir_name: &str) -> Self {
        Self {
            upload_dir: public_folder.join(upload_dir_name),
            public_folder,
            upload_dir_name: upload_dir_name.to_owned(),
        }
    }

    /// URL under which the static file service exposes a local upload.
    #[must_use]
    pub fn local_url(&self, file_name: &str) -> String {
        format!("/{}/{}", self.upload_dir_name, file_name)
    }
}

impl DeploymentSettings {
    #[must_use]
    pub const fn is_production(&self) -> bool {
        self.production
    }
}

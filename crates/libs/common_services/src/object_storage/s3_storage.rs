use crate::object_storage::{ObjectStorage, ObjectStorageError};
use app_state::{ObjectStorageSettings, SecretSettings};
use async_trait::async_trait;
use s3::creds::Credentials;
use s3::{Bucket, Region};
use tracing::{debug, instrument};

/// S3-compatible storage (AWS, R2, `MinIO`, ...).
pub struct S3ObjectStorage {
    bucket: Box<Bucket>,
    public_base_url: String,
}

impl S3ObjectStorage {
    pub fn new(
        settings: &ObjectStorageSettings,
        secrets: &SecretSettings,
    ) -> Result<Self, ObjectStorageError> {
        let region = Region::Custom {
            region: settings.region.clone(),
            endpoint: settings.endpoint.clone(),
        };
        let credentials = Credentials::new(
            Some(secrets.storage_access_key.as_str()),
            Some(secrets.storage_secret_key.as_str()),
            None,
            None,
            None,
        )?;
        let mut bucket = Bucket::new(&settings.bucket, region, credentials)?;
        if settings.path_style {
            bucket = bucket.with_path_style();
        }

        let public_base_url = settings
            .public_base_url
            .clone()
            .unwrap_or_else(|| bucket.url());

        Ok(Self {
            bucket,
            public_base_url: public_base_url.trim_end_matches('/').to_owned(),
        })
    }
}

#[async_trait]
impl ObjectStorage for S3ObjectStorage {
    #[instrument(skip(self, bytes), fields(len = bytes.len()))]
    async fn put_object(
        &self,
        key: &str,
        bytes: &[u8],
        content_type: &str,
    ) -> Result<(), ObjectStorageError> {
        let response = self
            .bucket
            .put_object_with_content_type(key, bytes, content_type)
            .await?;
        let status = response.status_code();
        if !(200..300).contains(&status) {
            return Err(ObjectStorageError::Rejected {
                key: key.to_owned(),
                status,
            });
        }
        debug!("Stored object {key}");
        Ok(())
    }

    fn object_url(&self, key: &str) -> String {
        format!("{}/{}", self.public_base_url, key)
    }
}

mod error;
mod memory;
mod s3_storage;

pub use error::*;
pub use memory::*;
pub use s3_storage::*;

use async_trait::async_trait;

/// Durable blob storage that uploaded assets are relayed to.
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Stores `bytes` under `key`, replacing any existing object.
    async fn put_object(
        &self,
        key: &str,
        bytes: &[u8],
        content_type: &str,
    ) -> Result<(), ObjectStorageError>;

    /// Public URL of the object stored under `key`.
    fn object_url(&self, key: &str) -> String;
}

/// Joins a key prefix and a file name without doubling or dropping the separator.
#[must_use]
pub fn object_key(prefix: &str, file_name: &str) -> String {
    let prefix = prefix.trim_matches('/');
    if prefix.is_empty() {
        file_name.to_owned()
    } else {
        format!("{prefix}/{file_name}")
    }
}

use crate::api::auth::caller::Caller;
use crate::api::upload::error::UploadError;
use crate::api::upload::interfaces::{
    FILE_ID_LENGTH, MAX_UPLOAD_SIZE_BYTES, UploadConfig, UploadResponse, UploadedFile,
};
use crate::api::upload::signature::{FileKind, read_signature};
use crate::api::upload::transcode::{to_lossless_webp, webp_sibling};
use crate::object_storage::{ObjectStorage, object_key};
use crate::utils::nice_id;
use color_eyre::eyre::{Result, WrapErr, eyre};
use std::path::{Path, PathBuf};
use tokio::{fs, task};
use tracing::{debug, info, instrument, warn};

/// `{stem}-{id}{.ext}` from the last path component of a client supplied name.
#[must_use]
pub fn stored_file_name(client_name: &str, id: &str) -> String {
    let name = Path::new(client_name.rsplit(['/', '\\']).next().unwrap_or_default());
    let stem = name
        .file_stem()
        .and_then(|s| s.to_str())
        .map(str::trim)
        .filter(|s| !s.is_empty() && *s != "." && *s != "..")
        .unwrap_or("file");
    let extension = name
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{e}"))
        .unwrap_or_default();
    format!("{stem}-{id}{extension}")
}

/// Deletes a local file, logging instead of failing.
async fn remove_local(path: &Path) {
    if let Err(e) = fs::remove_file(path).await {
        warn!("Could not delete local upload {}: {}", path.display(), e);
    }
}

/// Local files created during one upload. Whatever is still tracked when the upload fails is deleted.
#[derive(Debug, Default)]
struct TransientFiles(Vec<PathBuf>);

impl TransientFiles {
    fn track(&mut self, path: &Path) {
        if !self.0.iter().any(|p| p == path) {
            self.0.push(path.to_path_buf());
        }
    }

    fn forget(&mut self, path: &Path) {
        self.0.retain(|p| p != path);
    }

    async fn remove_all(self) {
        for path in self.0 {
            if fs::try_exists(&path).await.unwrap_or(false) {
                remove_local(&path).await;
            }
        }
    }
}

/// Stores one uploaded file and returns the URL it can be fetched from.
///
/// Images other than WebP are re-encoded as lossless WebP, the pre-transcode file is deleted.
/// In production the result is relayed to object storage and the local copy removed.
#[instrument(skip(file, config, storage), fields(file_name = file.as_ref().map(|f| f.file_name.as_str())))]
pub async fn upload_file(
    caller: Caller,
    file: Option<UploadedFile>,
    config: &UploadConfig,
    storage: &dyn ObjectStorage,
) -> Result<UploadResponse, UploadError> {
    if !caller.can_write() {
        return Err(UploadError::PermissionDenied);
    }
    let Some(file) = file else {
        return Err(UploadError::NoFile);
    };
    if file.bytes.len() > MAX_UPLOAD_SIZE_BYTES {
        return Err(UploadError::TooLarge);
    }

    let mut transient = TransientFiles::default();
    match store_file(&file, config, storage, &mut transient).await {
        Ok(url) => {
            info!("Upload stored at {url}");
            Ok(UploadResponse { url })
        }
        Err(e) => {
            transient.remove_all().await;
            Err(UploadError::Failed(e))
        }
    }
}

async fn store_file(
    file: &UploadedFile,
    config: &UploadConfig,
    storage: &dyn ObjectStorage,
    transient: &mut TransientFiles,
) -> Result<String> {
    let upload_dir = &config.upload.upload_dir;
    fs::create_dir_all(upload_dir)
        .await
        .wrap_err("cannot create upload directory")?;

    let saved_path = upload_dir.join(stored_file_name(&file.file_name, &nice_id(FILE_ID_LENGTH)));
    transient.track(&saved_path);
    fs::write(&saved_path, &file.bytes)
        .await
        .wrap_err("cannot write upload")?;

    let head = read_signature(&saved_path)
        .await
        .wrap_err("cannot read upload signature")?;
    let kind = FileKind::classify(&head);
    debug!("Classified {} as {kind:?}", saved_path.display());

    let (final_path, content_type) = match kind.decoder_format() {
        Some(format) => {
            let bytes = file.bytes.clone();
            let webp = task::spawn_blocking(move || to_lossless_webp(&bytes, format))
                .await
                .wrap_err("transcode task failed")??;

            let output = webp_sibling(&saved_path);
            transient.track(&output);
            fs::write(&output, &webp)
                .await
                .wrap_err("cannot write transcoded file")?;
            if output != saved_path {
                transient.forget(&saved_path);
                remove_local(&saved_path).await;
            }
            (output, "image/webp".to_owned())
        }
        None => {
            if let FileKind::Image { mime } = kind {
                warn!("No decoder for {mime}, storing {} as is", saved_path.display());
            }
            let content_type = kind.mime_type().map_or_else(
                || mime_guess::from_path(&saved_path).first_or_octet_stream().to_string(),
                str::to_owned,
            );
            (saved_path, content_type)
        }
    };

    let file_name = final_path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| eyre!("invalid upload file name"))?
        .to_owned();

    if !config.production {
        return Ok(config.upload.local_url(&file_name));
    }

    let bytes = fs::read(&final_path)
        .await
        .wrap_err("cannot read file for relay")?;
    let key = object_key(&config.key_prefix, &file_name);
    storage
        .put_object(&key, &bytes, &content_type)
        .await
        .wrap_err("object storage upload failed")?;
    transient.forget(&final_path);
    remove_local(&final_path).await;
    Ok(storage.object_url(&key))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stored_file_name() {
        assert_eq!(stored_file_name("cat.png", "ID"), "cat-ID.png");
        assert_eq!(stored_file_name("archive.tar.gz", "ID"), "archive.tar-ID.gz");
        assert_eq!(stored_file_name("README", "ID"), "README-ID");
        assert_eq!(stored_file_name("../../etc/passwd", "ID"), "passwd-ID");
        assert_eq!(stored_file_name("C:\\tmp\\dog.JPG", "ID"), "dog-ID.JPG");
        assert_eq!(stored_file_name("", "ID"), "file-ID");
        assert_eq!(stored_file_name("..", "ID"), "file-ID");
        assert_eq!(stored_file_name("dir/", "ID"), "file-ID");
    }
}

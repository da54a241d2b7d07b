use crate::api_state::ApiContext;
use crate::auth::caller::ApiCaller;
use axum::Json;
use axum::body::Bytes;
use axum::extract::multipart::MultipartError;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use common_services::api::upload::error::UploadError;
use common_services::api::upload::interfaces::{
    MAX_UPLOAD_SIZE_BYTES, UploadResponse, UploadedFile,
};
use common_services::api::upload::service::upload_file;
use tracing::debug;

const FILE_FIELD: &str = "file";

fn form_error(err: &MultipartError) -> UploadError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        UploadError::TooLarge
    } else {
        UploadError::InvalidForm(err.body_text())
    }
}

/// Reads the `file` field, refusing to buffer more than [`MAX_UPLOAD_SIZE_BYTES`].
async fn read_file_field(multipart: &mut Multipart) -> Result<Option<UploadedFile>, UploadError> {
    while let Some(mut field) = multipart.next_field().await.map_err(|e| form_error(&e))? {
        if field.name() != Some(FILE_FIELD) {
            debug!("Skipping multipart field {:?}", field.name());
            continue;
        }
        let file_name = field.file_name().unwrap_or_default().to_owned();

        let mut bytes = Vec::new();
        while let Some(chunk) = field.chunk().await.map_err(|e| form_error(&e))? {
            if bytes.len() + chunk.len() > MAX_UPLOAD_SIZE_BYTES {
                return Err(UploadError::TooLarge);
            }
            bytes.extend_from_slice(&chunk);
        }

        // Browsers send an empty, nameless part when no file was picked.
        if file_name.is_empty() && bytes.is_empty() {
            return Ok(None);
        }
        return Ok(Some(UploadedFile {
            file_name,
            bytes: Bytes::from(bytes),
        }));
    }
    Ok(None)
}

/// Upload a single file.
///
/// Images are converted to lossless WebP. The returned URL points at object storage in
/// production and at the local `/uploads` folder otherwise.
#[utoipa::path(
    post,
    path = "/upload",
    tag = "Upload",
    request_body(content_type = "multipart/form-data", description = "Form with a single `file` field."),
    responses(
        (status = 200, description = "File stored.", body = UploadResponse),
        (status = 400, description = "No file selected, or a malformed form."),
        (status = 403, description = "Permission denied."),
        (status = 413, description = "File larger than 10 MiB."),
        (status = 500, description = "Storing the file failed."),
    ),
    security(("bearer_auth" = []))
)]
pub async fn upload_handler(
    State(context): State<ApiContext>,
    ApiCaller(caller): ApiCaller,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, UploadError> {
    if !caller.can_write() {
        return Err(UploadError::PermissionDenied);
    }
    let file = read_file_field(&mut multipart).await?;
    let response = upload_file(
        caller,
        file,
        &context.upload,
        context.object_storage.as_ref(),
    )
    .await?;
    Ok(Json(response))
}

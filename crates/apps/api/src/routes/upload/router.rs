use crate::api_state::ApiContext;
use crate::routes::upload::handlers::upload_handler;
use axum::extract::DefaultBodyLimit;
use axum::{Router, routing::post};
use common_services::api::upload::interfaces::MAX_UPLOAD_SIZE_BYTES;

/// Room for multipart boundaries and headers on top of the file itself.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

pub fn upload_router() -> Router<ApiContext> {
    Router::new().route(
        "/upload",
        post(upload_handler).layer(DefaultBodyLimit::max(
            MAX_UPLOAD_SIZE_BYTES + MULTIPART_OVERHEAD_BYTES,
        )),
    )
}

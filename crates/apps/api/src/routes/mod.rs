mod api_doc;
pub mod auth;
pub mod posts;
pub mod root;
pub mod series;
pub mod upload;

use crate::api_state::ApiContext;
use crate::posts::router::posts_router;
use crate::root::router::root_public_router;
use crate::routes::api_doc::ApiDoc;
use crate::series::router::series_router;
use crate::upload::router::upload_router;
use axum::routing::get;
use axum::{Json, Router};
use utoipa::OpenApi;

// --- Router Construction ---
pub fn create_router(api_state: ApiContext) -> Router {
    Router::new()
        .route("/openapi.json", get(|| async { Json(ApiDoc::openapi()) }))
        .merge(root_public_router())
        .merge(series_router())
        .merge(posts_router())
        .merge(upload_router())
        .with_state(api_state)
}

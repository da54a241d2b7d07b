use crate::api_state::ApiContext;
use crate::routes::posts::handlers::{
    add_post_to_series_handler, create_post_handler, get_post_handler,
    remove_post_from_series_handler,
};
use axum::{
    Router,
    routing::{get, post, put},
};

pub fn posts_router() -> Router<ApiContext> {
    Router::new()
        .route("/posts", post(create_post_handler))
        .route("/posts/{post_id}", get(get_post_handler))
        .route(
            "/posts/{post_id}/series",
            put(add_post_to_series_handler).delete(remove_post_from_series_handler),
        )
}

use crate::api_state::ApiContext;
use crate::routes::series::handlers::{
    create_series_handler, delete_series_handler, get_series_by_slug_handler, get_series_handler,
    list_published_series_handler, list_series_handler, series_action_handler,
    update_series_handler, update_series_order_handler,
};
use axum::{
    Router,
    routing::{get, put},
};

pub fn series_router() -> Router<ApiContext> {
    Router::new()
        .route(
            "/series",
            get(list_series_handler).post(create_series_handler),
        )
        .route("/series/published", get(list_published_series_handler))
        .route("/series/slug/{slug}", get(get_series_by_slug_handler))
        .route(
            "/series/{series_id}",
            get(get_series_handler)
                .put(update_series_handler)
                .delete(delete_series_handler)
                .patch(series_action_handler),
        )
        .route("/series/{series_id}/order", put(update_series_order_handler))
}

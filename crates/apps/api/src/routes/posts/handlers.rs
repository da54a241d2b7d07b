use crate::api_state::ApiContext;
use crate::auth::caller::ApiCaller;
use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use common_services::api::posts::error::PostError;
use common_services::api::posts::interfaces::CreatePostRequest;
use common_services::api::posts::service::{create_post, get_post};
use common_services::api::series::error::SeriesError;
use common_services::api::series::interfaces::AddPostToSeriesRequest;
use common_services::api::series::service::{add_post_to_series, remove_post_from_series};
use common_services::database::{Post, Stores};

#[utoipa::path(
    post,
    path = "/posts",
    tag = "Posts",
    request_body = CreatePostRequest,
    responses(
        (status = 201, description = "Post created.", body = Post),
        (status = 400, description = "Validation failed."),
        (status = 403, description = "Permission denied."),
        (status = 409, description = "Slug already in use."),
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_post_handler(
    State(context): State<ApiContext>,
    ApiCaller(caller): ApiCaller,
    Json(payload): Json<CreatePostRequest>,
) -> Result<(StatusCode, Json<Post>), PostError> {
    let post = create_post(&context.stores, caller, context.id_length, payload).await?;
    Ok((StatusCode::CREATED, Json(post)))
}

#[utoipa::path(
    get,
    path = "/posts/{post_id}",
    tag = "Posts",
    params(
        ("post_id" = String, Path, description = "The unique ID of the post.")
    ),
    responses(
        (status = 200, description = "The post, including its series membership.", body = Post),
        (status = 404, description = "Post not found."),
    )
)]
pub async fn get_post_handler(
    State(stores): State<Stores>,
    Path(post_id): Path<String>,
) -> Result<Json<Post>, PostError> {
    Ok(Json(get_post(&stores, &post_id).await?))
}

/// Append a post to the end of a series.
#[utoipa::path(
    put,
    path = "/posts/{post_id}/series",
    tag = "Posts",
    params(
        ("post_id" = String, Path, description = "The unique ID of the post.")
    ),
    request_body = AddPostToSeriesRequest,
    responses(
        (status = 200, description = "The post with its new series and order.", body = Post),
        (status = 403, description = "Permission denied."),
        (status = 404, description = "Post or series not found."),
    ),
    security(("bearer_auth" = []))
)]
pub async fn add_post_to_series_handler(
    State(stores): State<Stores>,
    ApiCaller(caller): ApiCaller,
    Path(post_id): Path<String>,
    Json(payload): Json<AddPostToSeriesRequest>,
) -> Result<Json<Post>, SeriesError> {
    let post = add_post_to_series(&stores, caller, &post_id, &payload.series_id).await?;
    Ok(Json(post))
}

/// Take a post out of its series. Other members keep their order.
#[utoipa::path(
    delete,
    path = "/posts/{post_id}/series",
    tag = "Posts",
    params(
        ("post_id" = String, Path, description = "The unique ID of the post.")
    ),
    responses(
        (status = 200, description = "The detached post.", body = Post),
        (status = 403, description = "Permission denied."),
        (status = 404, description = "Post not found."),
    ),
    security(("bearer_auth" = []))
)]
pub async fn remove_post_from_series_handler(
    State(stores): State<Stores>,
    ApiCaller(caller): ApiCaller,
    Path(post_id): Path<String>,
) -> Result<Json<Post>, SeriesError> {
    Ok(Json(remove_post_from_series(&stores, caller, &post_id).await?))
}

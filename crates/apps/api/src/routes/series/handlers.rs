use crate::api_state::ApiContext;
use crate::auth::caller::ApiCaller;
use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use common_services::api::series::error::SeriesError;
use common_services::api::series::interfaces::{
    CreateSeriesRequest, ListSeriesQuery, SeriesAction, SeriesActionRequest, SeriesDetails,
    SeriesListResponse, SuccessResponse, UpdateSeriesOrderRequest, UpdateSeriesRequest,
};
use common_services::api::series::service::{
    create_series, delete_series, get_published_series_by_slug, get_series_by_id,
    list_published_series, list_series, toggle_series_published, update_series,
    update_series_order,
};
use common_services::database::{Series, Stores};
use tracing::info;

/// List series with filters and pagination.
///
/// Anonymous callers only get published series, whatever the `published` filter says.
#[utoipa::path(
    get,
    path = "/series",
    tag = "Series",
    params(ListSeriesQuery),
    responses(
        (status = 200, description = "One page of series.", body = SeriesListResponse),
        (status = 400, description = "Invalid pagination."),
        (status = 401, description = "Invalid token."),
    ),
    security((), ("bearer_auth" = []))
)]
pub async fn list_series_handler(
    State(stores): State<Stores>,
    ApiCaller(caller): ApiCaller,
    Query(query): Query<ListSeriesQuery>,
) -> Result<Json<SeriesListResponse>, SeriesError> {
    Ok(Json(list_series(&stores, caller, query).await?))
}

/// Create a new series.
#[utoipa::path(
    post,
    path = "/series",
    tag = "Series",
    request_body = CreateSeriesRequest,
    responses(
        (status = 201, description = "Series created.", body = Series),
        (status = 400, description = "Validation failed, all violations are listed."),
        (status = 403, description = "Permission denied."),
        (status = 409, description = "Title or slug already in use."),
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_series_handler(
    State(context): State<ApiContext>,
    ApiCaller(caller): ApiCaller,
    Json(payload): Json<CreateSeriesRequest>,
) -> Result<(StatusCode, Json<Series>), SeriesError> {
    info!("Create series handler {:?}", payload);
    let series = create_series(&context.stores, caller, context.id_length, payload).await?;
    Ok((StatusCode::CREATED, Json(series)))
}

/// All published series, newest first.
#[utoipa::path(
    get,
    path = "/series/published",
    tag = "Series",
    responses(
        (status = 200, description = "Published series with their published posts.", body = SeriesListResponse),
    )
)]
pub async fn list_published_series_handler(
    State(stores): State<Stores>,
) -> Result<Json<SeriesListResponse>, SeriesError> {
    Ok(Json(list_published_series(&stores).await?))
}

#[utoipa::path(
    get,
    path = "/series/slug/{slug}",
    tag = "Series",
    params(
        ("slug" = String, Path, description = "Slug of a published series.")
    ),
    responses(
        (status = 200, description = "The series with its published posts.", body = SeriesDetails),
        (status = 404, description = "No published series with this slug."),
    )
)]
pub async fn get_series_by_slug_handler(
    State(stores): State<Stores>,
    Path(slug): Path<String>,
) -> Result<Json<SeriesDetails>, SeriesError> {
    Ok(Json(get_published_series_by_slug(&stores, &slug).await?))
}

#[utoipa::path(
    get,
    path = "/series/{series_id}",
    tag = "Series",
    params(
        ("series_id" = String, Path, description = "The unique ID of the series.")
    ),
    responses(
        (status = 200, description = "The series with its published posts.", body = SeriesDetails),
        (status = 404, description = "Series not found, or unpublished for anonymous callers."),
    ),
    security((), ("bearer_auth" = []))
)]
pub async fn get_series_handler(
    State(stores): State<Stores>,
    ApiCaller(caller): ApiCaller,
    Path(series_id): Path<String>,
) -> Result<Json<SeriesDetails>, SeriesError> {
    Ok(Json(get_series_by_id(&stores, caller, &series_id).await?))
}

/// Update a series. Omitted fields are left unchanged.
#[utoipa::path(
    put,
    path = "/series/{series_id}",
    tag = "Series",
    params(
        ("series_id" = String, Path, description = "The unique ID of the series.")
    ),
    request_body = UpdateSeriesRequest,
    responses(
        (status = 200, description = "Updated series.", body = Series),
        (status = 400, description = "Validation failed."),
        (status = 403, description = "Permission denied."),
        (status = 404, description = "Series not found."),
        (status = 409, description = "Title or slug already in use."),
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_series_handler(
    State(stores): State<Stores>,
    ApiCaller(caller): ApiCaller,
    Path(series_id): Path<String>,
    Json(payload): Json<UpdateSeriesRequest>,
) -> Result<Json<Series>, SeriesError> {
    Ok(Json(
        update_series(&stores, caller, &series_id, payload).await?,
    ))
}

/// Delete a series. Member posts are kept and detached.
#[utoipa::path(
    delete,
    path = "/series/{series_id}",
    tag = "Series",
    params(
        ("series_id" = String, Path, description = "The unique ID of the series.")
    ),
    responses(
        (status = 204, description = "Series deleted."),
        (status = 403, description = "Permission denied."),
        (status = 404, description = "Series not found."),
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_series_handler(
    State(stores): State<Stores>,
    ApiCaller(caller): ApiCaller,
    Path(series_id): Path<String>,
) -> Result<StatusCode, SeriesError> {
    delete_series(&stores, caller, &series_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Run an action on a series, currently only `toggle-published`.
#[utoipa::path(
    patch,
    path = "/series/{series_id}",
    tag = "Series",
    params(
        ("series_id" = String, Path, description = "The unique ID of the series.")
    ),
    request_body = SeriesActionRequest,
    responses(
        (status = 200, description = "Series after the action.", body = Series),
        (status = 403, description = "Permission denied."),
        (status = 404, description = "Series not found."),
    ),
    security(("bearer_auth" = []))
)]
pub async fn series_action_handler(
    State(stores): State<Stores>,
    ApiCaller(caller): ApiCaller,
    Path(series_id): Path<String>,
    Json(payload): Json<SeriesActionRequest>,
) -> Result<Json<Series>, SeriesError> {
    let series = match payload.action {
        SeriesAction::TogglePublished => {
            toggle_series_published(&stores, caller, &series_id).await?
        }
    };
    Ok(Json(series))
}

/// Set the order of posts inside a series.
///
/// Every entry is applied independently. When one fails the others are not rolled back.
#[utoipa::path(
    put,
    path = "/series/{series_id}/order",
    tag = "Series",
    params(
        ("series_id" = String, Path, description = "The unique ID of the series.")
    ),
    request_body = UpdateSeriesOrderRequest,
    responses(
        (status = 200, description = "All orders applied.", body = SuccessResponse),
        (status = 400, description = "Validation failed, all violations are listed."),
        (status = 403, description = "Permission denied."),
        (status = 404, description = "Series not found."),
        (status = 500, description = "At least one update failed."),
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_series_order_handler(
    State(stores): State<Stores>,
    ApiCaller(caller): ApiCaller,
    Path(series_id): Path<String>,
    Json(payload): Json<UpdateSeriesOrderRequest>,
) -> Result<Json<SuccessResponse>, SeriesError> {
    let response = update_series_order(&stores, caller, &series_id, &payload.post_orders).await?;
    Ok(Json(response))
}

use crate::database::{Post, PublishedFilter, Series, SeriesSortField, SeriesWithCount, SortDirection};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

pub const DEFAULT_PAGE_SIZE: i64 = 10;
pub const MAX_PAGE_SIZE: i64 = 100;

// --- Request Payloads ---

#[derive(Debug, Default, Serialize, Deserialize, IntoParams, ToSchema)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ListSeriesQuery {
    /// Substring of the title.
    pub title: Option<String>,
    /// Substring of the slug.
    pub slug: Option<String>,
    /// Only honoured for admins, anonymous callers always see published series.
    pub published: Option<PublishedFilter>,
    pub order_by: Option<SeriesSortField>,
    pub order: Option<SortDirection>,
    /// 1-based.
    pub page_index: Option<i64>,
    pub page_size: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateSeriesRequest {
    pub title: String,
    pub slug: String,
    pub description: String,
    pub cover: Option<String>,
    #[serde(default)]
    pub published: bool,
}

/// Omitted fields keep their stored value.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSeriesRequest {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub cover: Option<String>,
    pub published: Option<bool>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum SeriesAction {
    TogglePublished,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SeriesActionRequest {
    pub action: SeriesAction,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PostOrder {
    pub post_id: String,
    /// Must fit the stored non-negative `i32`.
    pub order: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSeriesOrderRequest {
    pub post_orders: Vec<PostOrder>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddPostToSeriesRequest {
    pub series_id: String,
}

// --- Responses ---

/// A series with its published member posts, ordered by position.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SeriesDetails {
    #[serde(flatten)]
    pub series: Series,
    pub posts: Vec<Post>,
    /// Number of member posts, unpublished ones included.
    pub post_count: i64,
}

impl SeriesDetails {
    #[must_use]
    pub fn new(series: SeriesWithCount, posts: Vec<Post>) -> Self {
        Self {
            series: series.series,
            posts,
            post_count: series.post_count,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SeriesListResponse {
    pub series: Vec<SeriesDetails>,
    pub total: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SuccessResponse {
    pub success: bool,
}

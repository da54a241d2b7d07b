use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// A single series row.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Series {
    pub id: String,
    pub title: String,
    pub slug: String,
    pub description: String,
    pub cover: Option<String>,
    pub published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Series row joined with the number of member posts, published or not.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SeriesWithCount {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub series: Series,
    pub post_count: i64,
}

/// Fields for a new series row.
#[derive(Debug, Clone)]
pub struct NewSeries {
    pub id: String,
    pub title: String,
    pub slug: String,
    pub description: String,
    pub cover: Option<String>,
    pub published: bool,
}

/// Partial update, `None` keeps the stored value.
#[derive(Debug, Clone, Default)]
pub struct SeriesChanges {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub cover: Option<String>,
    pub published: Option<bool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum PublishedFilter {
    #[default]
    All,
    Published,
    Unpublished,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum SeriesSortField {
    CreatedAt,
    UpdatedAt,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

/// Store-level listing filter. Text filters match as case-sensitive substrings and are OR-combined.
#[derive(Debug, Clone)]
pub struct SeriesFilter {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub published: PublishedFilter,
    pub sort: Option<(SeriesSortField, SortDirection)>,
    pub offset: i64,
    pub limit: i64,
}

impl Default for SeriesFilter {
    fn default() -> Self {
        Self {
            title: None,
            slug: None,
            published: PublishedFilter::All,
            sort: None,
            offset: 0,
            limit: 10,
        }
    }
}

impl SeriesFilter {
    /// Whether a row satisfies the text and published filters.
    #[must_use]
    pub fn matches(&self, series: &Series) -> bool {
        let published_ok = match self.published {
            PublishedFilter::All => true,
            PublishedFilter::Published => series.published,
            PublishedFilter::Unpublished => !series.published,
        };
        let text_ok = match (&self.title, &self.slug) {
            (None, None) => true,
            (title, slug) => {
                title.as_deref().is_some_and(|t| series.title.contains(t))
                    || slug.as_deref().is_some_and(|s| series.slug.contains(s))
            }
        };
        published_ok && text_ok
    }
}

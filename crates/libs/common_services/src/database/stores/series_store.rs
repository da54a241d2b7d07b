use crate::database::{DbError, NewSeries, Series, SeriesChanges, SeriesFilter, SeriesWithCount};
use async_trait::async_trait;

#[async_trait]
pub trait SeriesStore: Send + Sync {
    async fn create(&self, new_series: NewSeries) -> Result<Series, DbError>;

    /// Applies the provided fields and bumps `updated_at`. `None` when the id is unknown.
    async fn update(&self, id: &str, changes: SeriesChanges) -> Result<Option<Series>, DbError>;

    async fn find_by_id(&self, id: &str) -> Result<Option<Series>, DbError>;

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Series>, DbError>;

    /// Series sharing the title OR the slug, ignoring `exclude_id`.
    async fn find_conflicts(
        &self,
        title: Option<&str>,
        slug: Option<&str>,
        exclude_id: Option<&str>,
    ) -> Result<Vec<Series>, DbError>;

    /// One page of matching series plus the total number of matches.
    async fn list(&self, filter: &SeriesFilter) -> Result<(Vec<SeriesWithCount>, i64), DbError>;

    /// Every published series, newest first.
    async fn list_published(&self) -> Result<Vec<SeriesWithCount>, DbError>;

    async fn toggle_published(&self, id: &str) -> Result<Option<Series>, DbError>;

    /// Returns false when nothing was deleted.
    async fn delete(&self, id: &str) -> Result<bool, DbError>;

    async fn ping(&self) -> Result<(), DbError>;
}

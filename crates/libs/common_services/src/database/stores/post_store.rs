use crate::database::{DbError, NewPost, Post};
use async_trait::async_trait;

#[async_trait]
pub trait PostStore: Send + Sync {
    async fn create(&self, new_post: NewPost) -> Result<Post, DbError>;

    async fn find_by_id(&self, id: &str) -> Result<Option<Post>, DbError>;

    /// Member posts ordered by `series_order`.
    async fn list_by_series(&self, series_id: &str, published_only: bool)
    -> Result<Vec<Post>, DbError>;

    /// Highest `series_order` among the members, `None` for an empty series.
    async fn max_series_order(&self, series_id: &str) -> Result<Option<i32>, DbError>;

    /// Sets (or with `None`, clears) both the series reference and the order.
    async fn set_membership(
        &self,
        post_id: &str,
        membership: Option<(&str, i32)>,
    ) -> Result<Post, DbError>;

    /// Overwrites the order of a single post. `RowNotFound` if the post does not exist.
    async fn set_series_order(&self, post_id: &str, order: i32) -> Result<(), DbError>;

    /// Clears series reference and order on every member, returns the number of posts touched.
    async fn detach_all(&self, series_id: &str) -> Result<u64, DbError>;
}

use crate::database::{
    DbError, NewPost, NewSeries, Post, PostStore, Series, SeriesChanges, SeriesFilter,
    SeriesSortField, SeriesStore, SeriesWithCount, SortDirection,
};
use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

#[derive(Debug, Default)]
struct Tables {
    series: Vec<Series>,
    posts: Vec<Post>,
}

impl Tables {
    fn post_count(&self, series_id: &str) -> i64 {
        self.posts
            .iter()
            .filter(|p| p.series_id.as_deref() == Some(series_id))
            .count() as i64
    }

    fn with_count(&self, series: &Series) -> SeriesWithCount {
        SeriesWithCount {
            series: series.clone(),
            post_count: self.post_count(&series.id),
        }
    }

    fn check_series_unique(&self, id: &str, title: &str, slug: &str) -> Result<(), DbError> {
        for other in self.series.iter().filter(|s| s.id != id) {
            if other.title == title {
                return Err(DbError::UniqueViolation {
                    constraint: "series_title_key".to_owned(),
                });
            }
            if other.slug == slug {
                return Err(DbError::UniqueViolation {
                    constraint: "series_slug_key".to_owned(),
                });
            }
        }
        Ok(())
    }
}

/// Process-local store with the same constraints as the Postgres schema.
/// Used by tests and by `database.backend: memory`.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

#[async_trait]
impl SeriesStore for InMemoryStore {
    async fn create(&self, new_series: NewSeries) -> Result<Series, DbError> {
        let mut tables = self.tables.write().await;
        if tables.series.iter().any(|s| s.id == new_series.id) {
            return Err(DbError::UniqueViolation {
                constraint: "series_pkey".to_owned(),
            });
        }
        tables.check_series_unique(&new_series.id, &new_series.title, &new_series.slug)?;

        let now = Utc::now();
        let series = Series {
            id: new_series.id,
            title: new_series.title,
            slug: new_series.slug,
            description: new_series.description,
            cover: new_series.cover,
            published: new_series.published,
            created_at: now,
            updated_at: now,
        };
        tables.series.push(series.clone());
        Ok(series)
    }

    async fn update(&self, id: &str, changes: SeriesChanges) -> Result<Option<Series>, DbError> {
        let mut tables = self.tables.write().await;
        let Some(current) = tables.series.iter().find(|s| s.id == id).cloned() else {
            return Ok(None);
        };

        let updated = Series {
            title: changes.title.unwrap_or(current.title),
            slug: changes.slug.unwrap_or(current.slug),
            description: changes.description.unwrap_or(current.description),
            cover: changes.cover.or(current.cover),
            published: changes.published.unwrap_or(current.published),
            updated_at: Utc::now(),
            ..current
        };
        tables.check_series_unique(id, &updated.title, &updated.slug)?;

        if let Some(slot) = tables.series.iter_mut().find(|s| s.id == id) {
            *slot = updated.clone();
        }
        Ok(Some(updated))
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Series>, DbError> {
        let tables = self.tables.read().await;
        Ok(tables.series.iter().find(|s| s.id == id).cloned())
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Series>, DbError> {
        let tables = self.tables.read().await;
        Ok(tables.series.iter().find(|s| s.slug == slug).cloned())
    }

    async fn find_conflicts(
        &self,
        title: Option<&str>,
        slug: Option<&str>,
        exclude_id: Option<&str>,
    ) -> Result<Vec<Series>, DbError> {
        let tables = self.tables.read().await;
        Ok(tables
            .series
            .iter()
            .filter(|s| Some(s.id.as_str()) != exclude_id)
            .filter(|s| title == Some(s.title.as_str()) || slug == Some(s.slug.as_str()))
            .cloned()
            .collect())
    }

    async fn list(&self, filter: &SeriesFilter) -> Result<(Vec<SeriesWithCount>, i64), DbError> {
        let tables = self.tables.read().await;
        let mut matching: Vec<&Series> =
            tables.series.iter().filter(|s| filter.matches(s)).collect();

        let (column, direction) = filter
            .sort
            .unwrap_or((SeriesSortField::CreatedAt, SortDirection::Desc));
        matching.sort_by(|a, b| {
            let ordering = match column {
                SeriesSortField::CreatedAt => a.created_at.cmp(&b.created_at),
                SeriesSortField::UpdatedAt => a.updated_at.cmp(&b.updated_at),
            };
            let ordering = match direction {
                SortDirection::Asc => ordering,
                SortDirection::Desc => ordering.reverse(),
            };
            ordering.then_with(|| a.id.cmp(&b.id))
        });

        let total = matching.len() as i64;
        let offset = usize::try_from(filter.offset).unwrap_or(0);
        let limit = usize::try_from(filter.limit).unwrap_or(0);
        let page = matching
            .into_iter()
            .skip(offset)
            .take(limit)
            .map(|s| tables.with_count(s))
            .collect();
        Ok((page, total))
    }

    async fn list_published(&self) -> Result<Vec<SeriesWithCount>, DbError> {
        let tables = self.tables.read().await;
        let mut published: Vec<&Series> = tables.series.iter().filter(|s| s.published).collect();
        published.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(published.into_iter().map(|s| tables.with_count(s)).collect())
    }

    async fn toggle_published(&self, id: &str) -> Result<Option<Series>, DbError> {
        let mut tables = self.tables.write().await;
        Ok(tables.series.iter_mut().find(|s| s.id == id).map(|s| {
            s.published = !s.published;
            s.updated_at = Utc::now();
            s.clone()
        }))
    }

    async fn delete(&self, id: &str) -> Result<bool, DbError> {
        let mut tables = self.tables.write().await;
        let before = tables.series.len();
        tables.series.retain(|s| s.id != id);
        if tables.series.len() == before {
            return Ok(false);
        }
        // ON DELETE SET NULL
        for post in &mut tables.posts {
            if post.series_id.as_deref() == Some(id) {
                post.series_id = None;
            }
        }
        Ok(true)
    }

    async fn ping(&self) -> Result<(), DbError> {
        Ok(())
    }
}

#[async_trait]
impl PostStore for InMemoryStore {
    async fn create(&self, new_post: NewPost) -> Result<Post, DbError> {
        let mut tables = self.tables.write().await;
        if tables.posts.iter().any(|p| p.id == new_post.id) {
            return Err(DbError::UniqueViolation {
                constraint: "post_pkey".to_owned(),
            });
        }
        if tables.posts.iter().any(|p| p.slug == new_post.slug) {
            return Err(DbError::UniqueViolation {
                constraint: "post_slug_key".to_owned(),
            });
        }

        let now = Utc::now();
        let post = Post {
            id: new_post.id,
            title: new_post.title,
            slug: new_post.slug,
            published: new_post.published,
            series_id: None,
            series_order: None,
            created_at: now,
            updated_at: now,
        };
        tables.posts.push(post.clone());
        Ok(post)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Post>, DbError> {
        let tables = self.tables.read().await;
        Ok(tables.posts.iter().find(|p| p.id == id).cloned())
    }

    async fn list_by_series(
        &self,
        series_id: &str,
        published_only: bool,
    ) -> Result<Vec<Post>, DbError> {
        let tables = self.tables.read().await;
        let mut posts: Vec<Post> = tables
            .posts
            .iter()
            .filter(|p| p.series_id.as_deref() == Some(series_id))
            .filter(|p| !published_only || p.published)
            .cloned()
            .collect();
        // NULLS LAST
        posts.sort_by_key(|p| (p.series_order.is_none(), p.series_order, p.id.clone()));
        Ok(posts)
    }

    async fn max_series_order(&self, series_id: &str) -> Result<Option<i32>, DbError> {
        let tables = self.tables.read().await;
        Ok(tables
            .posts
            .iter()
            .filter(|p| p.series_id.as_deref() == Some(series_id))
            .filter_map(|p| p.series_order)
            .max())
    }

    async fn set_membership(
        &self,
        post_id: &str,
        membership: Option<(&str, i32)>,
    ) -> Result<Post, DbError> {
        let mut tables = self.tables.write().await;
        if let Some((series_id, _)) = membership {
            if !tables.series.iter().any(|s| s.id == series_id) {
                return Err(DbError::ForeignKeyViolation {
                    constraint: "post_series_id_fkey".to_owned(),
                });
            }
        }
        if membership.is_some_and(|(_, order)| order < 0) {
            return Err(DbError::CheckViolation {
                constraint: "post_series_order_check".to_owned(),
            });
        }

        let post = tables
            .posts
            .iter_mut()
            .find(|p| p.id == post_id)
            .ok_or(DbError::RowNotFound)?;
        post.series_id = membership.map(|(series_id, _)| series_id.to_owned());
        post.series_order = membership.map(|(_, order)| order);
        post.updated_at = Utc::now();
        Ok(post.clone())
    }

    async fn set_series_order(&self, post_id: &str, order: i32) -> Result<(), DbError> {
        if order < 0 {
            return Err(DbError::CheckViolation {
                constraint: "post_series_order_check".to_owned(),
            });
        }
        let mut tables = self.tables.write().await;
        let post = tables
            .posts
            .iter_mut()
            .find(|p| p.id == post_id)
            .ok_or(DbError::RowNotFound)?;
        post.series_order = Some(order);
        post.updated_at = Utc::now();
        Ok(())
    }

    async fn detach_all(&self, series_id: &str) -> Result<u64, DbError> {
        let mut tables = self.tables.write().await;
        let mut touched = 0;
        for post in &mut tables.posts {
            if post.series_id.as_deref() == Some(series_id) {
                post.series_id = None;
                post.series_order = None;
                post.updated_at = Utc::now();
                touched += 1;
            }
        }
        Ok(touched)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_series(id: &str, title: &str, slug: &str) -> NewSeries {
        NewSeries {
            id: id.to_owned(),
            title: title.to_owned(),
            slug: slug.to_owned(),
            description: "desc".to_owned(),
            cover: None,
            published: true,
        }
    }

    fn new_post(id: &str) -> NewPost {
        NewPost {
            id: id.to_owned(),
            title: format!("Post {id}"),
            slug: format!("post-{id}"),
            published: true,
        }
    }

    #[tokio::test]
    async fn test_unique_slug_is_enforced() -> color_eyre::Result<()> {
        let store = InMemoryStore::default();
        SeriesStore::create(&store, new_series("a", "Guide", "guide")).await?;

        let result = SeriesStore::create(&store, new_series("b", "Other", "guide")).await;

        assert!(matches!(
            result,
            Err(DbError::UniqueViolation { constraint }) if constraint == "series_slug_key"
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_series_sets_member_reference_null() -> color_eyre::Result<()> {
        // ARRANGE
        let store = InMemoryStore::default();
        SeriesStore::create(&store, new_series("s", "Series", "series")).await?;
        PostStore::create(&store, new_post("p")).await?;
        store.set_membership("p", Some(("s", 0))).await?;

        // ACT
        let deleted = SeriesStore::delete(&store, "s").await?;

        // ASSERT
        assert!(deleted);
        let post = PostStore::find_by_id(&store, "p").await?.expect("post exists");
        assert_eq!(post.series_id, None);
        Ok(())
    }

    #[tokio::test]
    async fn test_list_by_series_orders_nulls_last() -> color_eyre::Result<()> {
        let store = InMemoryStore::default();
        SeriesStore::create(&store, new_series("s", "Series", "series")).await?;
        for (id, order) in [("a", 2), ("b", 0), ("c", 1)] {
            PostStore::create(&store, new_post(id)).await?;
            store.set_membership(id, Some(("s", order))).await?;
        }

        let ids: Vec<String> = store
            .list_by_series("s", false)
            .await?
            .into_iter()
            .map(|p| p.id)
            .collect();

        assert_eq!(ids, ["b", "c", "a"]);
        assert_eq!(store.max_series_order("s").await?, Some(2));
        assert_eq!(store.max_series_order("missing").await?, None);
        Ok(())
    }
}

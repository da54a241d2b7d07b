use crate::database::{
    DbError, NewPost, NewSeries, Post, PostStore, PublishedFilter, Series, SeriesChanges,
    SeriesFilter, SeriesSortField, SeriesStore, SeriesWithCount, SortDirection,
};
use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};

const SERIES_WITH_COUNT: &str = r"
    SELECT s.*,
           (SELECT COUNT(*) FROM post p WHERE p.series_id = s.id) AS post_count
    FROM series s
";

/// Postgres-backed implementation of both store traits.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn push_series_filter(query: &mut QueryBuilder<'_, Postgres>, filter: &SeriesFilter) {
        query.push(" WHERE TRUE");
        match filter.published {
            PublishedFilter::All => {}
            PublishedFilter::Published => {
                query.push(" AND s.published = TRUE");
            }
            PublishedFilter::Unpublished => {
                query.push(" AND s.published = FALSE");
            }
        }

        if filter.title.is_none() && filter.slug.is_none() {
            return;
        }
        query.push(" AND (FALSE");
        if let Some(title) = &filter.title {
            query.push(" OR strpos(s.title, ");
            query.push_bind(title.clone());
            query.push(") > 0");
        }
        if let Some(slug) = &filter.slug {
            query.push(" OR strpos(s.slug, ");
            query.push_bind(slug.clone());
            query.push(") > 0");
        }
        query.push(")");
    }
}

#[async_trait]
impl SeriesStore for PgStore {
    async fn create(&self, new_series: NewSeries) -> Result<Series, DbError> {
        Ok(sqlx::query_as::<_, Series>(
            r"
            INSERT INTO series (id, title, slug, description, cover, published)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            ",
        )
        .bind(new_series.id)
        .bind(new_series.title)
        .bind(new_series.slug)
        .bind(new_series.description)
        .bind(new_series.cover)
        .bind(new_series.published)
        .fetch_one(&self.pool)
        .await?)
    }

    async fn update(&self, id: &str, changes: SeriesChanges) -> Result<Option<Series>, DbError> {
        Ok(sqlx::query_as::<_, Series>(
            r"
            UPDATE series
            SET
                title = COALESCE($1, title),
                slug = COALESCE($2, slug),
                description = COALESCE($3, description),
                cover = COALESCE($4, cover),
                published = COALESCE($5, published),
                updated_at = now()
            WHERE id = $6
            RETURNING *
            ",
        )
        .bind(changes.title)
        .bind(changes.slug)
        .bind(changes.description)
        .bind(changes.cover)
        .bind(changes.published)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Series>, DbError> {
        Ok(
            sqlx::query_as::<_, Series>("SELECT * FROM series WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Series>, DbError> {
        Ok(
            sqlx::query_as::<_, Series>("SELECT * FROM series WHERE slug = $1")
                .bind(slug)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    async fn find_conflicts(
        &self,
        title: Option<&str>,
        slug: Option<&str>,
        exclude_id: Option<&str>,
    ) -> Result<Vec<Series>, DbError> {
        Ok(sqlx::query_as::<_, Series>(
            r"
            SELECT * FROM series
            WHERE (title = $1 OR slug = $2)
              AND ($3::TEXT IS NULL OR id <> $3)
            ",
        )
        .bind(title)
        .bind(slug)
        .bind(exclude_id)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn list(&self, filter: &SeriesFilter) -> Result<(Vec<SeriesWithCount>, i64), DbError> {
        let mut count_query = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM series s");
        Self::push_series_filter(&mut count_query, filter);
        let total: i64 = count_query
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await?;

        let mut query = QueryBuilder::<Postgres>::new(SERIES_WITH_COUNT);
        Self::push_series_filter(&mut query, filter);
        let (column, direction) = filter
            .sort
            .unwrap_or((SeriesSortField::CreatedAt, SortDirection::Desc));
        query.push(match column {
            SeriesSortField::CreatedAt => " ORDER BY s.created_at",
            SeriesSortField::UpdatedAt => " ORDER BY s.updated_at",
        });
        query.push(match direction {
            SortDirection::Asc => " ASC",
            SortDirection::Desc => " DESC",
        });
        query.push(", s.id LIMIT ");
        query.push_bind(filter.limit);
        query.push(" OFFSET ");
        query.push_bind(filter.offset);

        let series = query
            .build_query_as::<SeriesWithCount>()
            .fetch_all(&self.pool)
            .await?;
        Ok((series, total))
    }

    async fn list_published(&self) -> Result<Vec<SeriesWithCount>, DbError> {
        Ok(sqlx::query_as::<_, SeriesWithCount>(&format!(
            "{SERIES_WITH_COUNT} WHERE s.published = TRUE ORDER BY s.created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await?)
    }

    async fn toggle_published(&self, id: &str) -> Result<Option<Series>, DbError> {
        Ok(sqlx::query_as::<_, Series>(
            r"
            UPDATE series
            SET published = NOT published, updated_at = now()
            WHERE id = $1
            RETURNING *
            ",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn delete(&self, id: &str) -> Result<bool, DbError> {
        let result = sqlx::query("DELETE FROM series WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn ping(&self) -> Result<(), DbError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl PostStore for PgStore {
    async fn create(&self, new_post: NewPost) -> Result<Post, DbError> {
        Ok(sqlx::query_as::<_, Post>(
            r"
            INSERT INTO post (id, title, slug, published)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            ",
        )
        .bind(new_post.id)
        .bind(new_post.title)
        .bind(new_post.slug)
        .bind(new_post.published)
        .fetch_one(&self.pool)
        .await?)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Post>, DbError> {
        Ok(
            sqlx::query_as::<_, Post>("SELECT * FROM post WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    async fn list_by_series(
        &self,
        series_id: &str,
        published_only: bool,
    ) -> Result<Vec<Post>, DbError> {
        Ok(sqlx::query_as::<_, Post>(
            r"
            SELECT * FROM post
            WHERE series_id = $1 AND (NOT $2 OR published)
            ORDER BY series_order ASC NULLS LAST, id
            ",
        )
        .bind(series_id)
        .bind(published_only)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn max_series_order(&self, series_id: &str) -> Result<Option<i32>, DbError> {
        Ok(
            sqlx::query_scalar::<_, Option<i32>>(
                "SELECT MAX(series_order) FROM post WHERE series_id = $1",
            )
            .bind(series_id)
            .fetch_one(&self.pool)
            .await?,
        )
    }

    async fn set_membership(
        &self,
        post_id: &str,
        membership: Option<(&str, i32)>,
    ) -> Result<Post, DbError> {
        let (series_id, order) = membership.unzip();
        sqlx::query_as::<_, Post>(
            r"
            UPDATE post
            SET series_id = $1, series_order = $2, updated_at = now()
            WHERE id = $3
            RETURNING *
            ",
        )
        .bind(series_id)
        .bind(order)
        .bind(post_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(DbError::RowNotFound)
    }

    async fn set_series_order(&self, post_id: &str, order: i32) -> Result<(), DbError> {
        let result =
            sqlx::query("UPDATE post SET series_order = $1, updated_at = now() WHERE id = $2")
                .bind(order)
                .bind(post_id)
                .execute(&self.pool)
                .await?;
        if result.rows_affected() == 0 {
            return Err(DbError::RowNotFound);
        }
        Ok(())
    }

    async fn detach_all(&self, series_id: &str) -> Result<u64, DbError> {
        let result = sqlx::query(
            r"
            UPDATE post
            SET series_id = NULL, series_order = NULL, updated_at = now()
            WHERE series_id = $1
            ",
        )
        .bind(series_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }
}

use crate::api::auth::caller::Caller;
use crate::api::series::error::SeriesError;
use crate::api::series::interfaces::{
    CreateSeriesRequest, DEFAULT_PAGE_SIZE, ListSeriesQuery, MAX_PAGE_SIZE, PostOrder,
    SeriesDetails, SeriesListResponse, SuccessResponse, UpdateSeriesRequest,
};
use crate::api::series::validation::{validate_create, validate_order_batch, validate_update};
use crate::database::{
    DbError, NewSeries, Post, PublishedFilter, Series, SeriesChanges, SeriesFilter,
    SeriesWithCount, Stores,
};
use crate::utils::nice_id;
use futures_util::future::{join_all, try_join_all};
use tracing::{info, instrument};

fn ensure_can_write(caller: Caller) -> Result<(), SeriesError> {
    if caller.can_write() {
        Ok(())
    } else {
        Err(SeriesError::PermissionDenied)
    }
}

fn ensure_valid(violations: Vec<String>) -> Result<(), SeriesError> {
    if violations.is_empty() {
        Ok(())
    } else {
        Err(SeriesError::Validation(violations))
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

/// Loads all members once: published ones are returned, all of them are counted.
async fn load_details(stores: &Stores, series: Series) -> Result<SeriesDetails, SeriesError> {
    let members = stores.posts.list_by_series(&series.id, false).await?;
    let post_count = members.len() as i64;
    let posts = members.into_iter().filter(|p| p.published).collect();
    Ok(SeriesDetails {
        series,
        posts,
        post_count,
    })
}

async fn attach_published_posts(
    stores: &Stores,
    series: Vec<SeriesWithCount>,
) -> Result<Vec<SeriesDetails>, SeriesError> {
    try_join_all(series.into_iter().map(|s| async move {
        let posts = stores.posts.list_by_series(&s.series.id, true).await?;
        Ok::<_, SeriesError>(SeriesDetails::new(s, posts))
    }))
    .await
}

/// Names the field(s) of `title`/`slug` already taken by `conflicts`.
fn conflict_message(conflicts: &[Series], title: Option<&str>, slug: Option<&str>) -> String {
    let title_taken = title.is_some_and(|t| conflicts.iter().any(|s| s.title == t));
    let slug_taken = slug.is_some_and(|sl| conflicts.iter().any(|s| s.slug == sl));
    let fields = match (title_taken, slug_taken) {
        (true, true) => "title and slug",
        (true, false) => "title",
        _ => "slug",
    };
    format!("a series with this {fields} already exists")
}

async fn ensure_unique(
    stores: &Stores,
    title: Option<&str>,
    slug: Option<&str>,
    exclude_id: Option<&str>,
) -> Result<(), SeriesError> {
    if title.is_none() && slug.is_none() {
        return Ok(());
    }
    let conflicts = stores
        .series
        .find_conflicts(title, slug, exclude_id)
        .await?;
    if conflicts.is_empty() {
        Ok(())
    } else {
        Err(SeriesError::Conflict(conflict_message(&conflicts, title, slug)))
    }
}

//================================================================================
// Queries
//================================================================================

/// Paginated, filtered list of series. Anonymous callers only ever see published series.
#[instrument(skip(stores))]
pub async fn list_series(
    stores: &Stores,
    caller: Caller,
    query: ListSeriesQuery,
) -> Result<SeriesListResponse, SeriesError> {
    let page_index = query.page_index.unwrap_or(1);
    let page_size = query.page_size.unwrap_or(DEFAULT_PAGE_SIZE);
    let mut violations = Vec::new();
    if page_index < 1 {
        violations.push("pageIndex must be >= 1".to_owned());
    }
    if !(1..=MAX_PAGE_SIZE).contains(&page_size) {
        violations.push(format!("pageSize must be between 1 and {MAX_PAGE_SIZE}"));
    }
    ensure_valid(violations)?;

    let published = if caller.can_write() {
        query.published.unwrap_or_default()
    } else {
        PublishedFilter::Published
    };
    let filter = SeriesFilter {
        title: non_blank(query.title),
        slug: non_blank(query.slug),
        published,
        sort: query.order_by.zip(query.order),
        offset: (page_index - 1).saturating_mul(page_size),
        limit: page_size,
    };

    let (series, total) = stores.series.list(&filter).await?;
    let series = attach_published_posts(stores, series).await?;
    Ok(SeriesListResponse { series, total })
}

/// Every published series, newest first.
#[instrument(skip(stores))]
pub async fn list_published_series(stores: &Stores) -> Result<SeriesListResponse, SeriesError> {
    let series = stores.series.list_published().await?;
    let total = series.len() as i64;
    let series = attach_published_posts(stores, series).await?;
    Ok(SeriesListResponse { series, total })
}

/// Unpublished series are reported as not found to anonymous callers.
#[instrument(skip(stores))]
pub async fn get_series_by_id(
    stores: &Stores,
    caller: Caller,
    id: &str,
) -> Result<SeriesDetails, SeriesError> {
    let series = stores
        .series
        .find_by_id(id)
        .await?
        .filter(|s| s.published || caller.can_write())
        .ok_or_else(|| SeriesError::NotFound(id.to_owned()))?;
    load_details(stores, series).await
}

#[instrument(skip(stores))]
pub async fn get_published_series_by_slug(
    stores: &Stores,
    slug: &str,
) -> Result<SeriesDetails, SeriesError> {
    let series = stores
        .series
        .find_by_slug(slug)
        .await?
        .filter(|s| s.published)
        .ok_or_else(|| SeriesError::NotFound(slug.to_owned()))?;
    load_details(stores, series).await
}

//================================================================================
// Series management
//================================================================================

/// Creates a series. Both the title and the slug must be unused.
#[instrument(skip(stores))]
pub async fn create_series(
    stores: &Stores,
    caller: Caller,
    id_length: usize,
    request: CreateSeriesRequest,
) -> Result<Series, SeriesError> {
    ensure_can_write(caller)?;
    ensure_valid(validate_create(&request))?;
    ensure_unique(
        stores,
        Some(request.title.as_str()),
        Some(request.slug.as_str()),
        None,
    )
    .await?;

    let series = stores
        .series
        .create(NewSeries {
            id: nice_id(id_length),
            title: request.title,
            slug: request.slug,
            description: request.description,
            cover: request.cover,
            published: request.published,
        })
        .await?;
    info!("Created series {} ({})", series.id, series.slug);
    Ok(series)
}

/// Partial update, omitted fields keep their stored value.
#[instrument(skip(stores))]
pub async fn update_series(
    stores: &Stores,
    caller: Caller,
    id: &str,
    request: UpdateSeriesRequest,
) -> Result<Series, SeriesError> {
    ensure_can_write(caller)?;
    ensure_valid(validate_update(&request))?;
    if stores.series.find_by_id(id).await?.is_none() {
        return Err(SeriesError::NotFound(id.to_owned()));
    }
    ensure_unique(
        stores,
        request.title.as_deref(),
        request.slug.as_deref(),
        Some(id),
    )
    .await?;

    let changes = SeriesChanges {
        title: request.title,
        slug: request.slug,
        description: request.description,
        cover: request.cover,
        published: request.published,
    };
    stores
        .series
        .update(id, changes)
        .await?
        .ok_or_else(|| SeriesError::NotFound(id.to_owned()))
}

/// Detaches every member post, then deletes the series.
#[instrument(skip(stores))]
pub async fn delete_series(stores: &Stores, caller: Caller, id: &str) -> Result<(), SeriesError> {
    ensure_can_write(caller)?;
    if stores.series.find_by_id(id).await?.is_none() {
        return Err(SeriesError::NotFound(id.to_owned()));
    }

    let detached = stores.posts.detach_all(id).await?;
    if !stores.series.delete(id).await? {
        return Err(SeriesError::NotFound(id.to_owned()));
    }
    info!("Deleted series {id}, detached {detached} posts");
    Ok(())
}

#[instrument(skip(stores))]
pub async fn toggle_series_published(
    stores: &Stores,
    caller: Caller,
    id: &str,
) -> Result<Series, SeriesError> {
    ensure_can_write(caller)?;
    stores
        .series
        .toggle_published(id)
        .await?
        .ok_or_else(|| SeriesError::NotFound(id.to_owned()))
}

//================================================================================
// Member order
//================================================================================

/// Applies a batch of `(post, order)` assignments.
///
/// All updates are dispatched concurrently and awaited together. A failing update does not
/// cancel or roll back the others; the first failure (in input order) is returned.
/// Concurrent batches on the same series can interleave.
#[instrument(skip(stores, post_orders), fields(count = post_orders.len()))]
pub async fn update_series_order(
    stores: &Stores,
    caller: Caller,
    series_id: &str,
    post_orders: &[PostOrder],
) -> Result<SuccessResponse, SeriesError> {
    ensure_can_write(caller)?;
    ensure_valid(validate_order_batch(series_id, post_orders))?;
    if stores.series.find_by_id(series_id).await?.is_none() {
        return Err(SeriesError::NotFound(series_id.to_owned()));
    }

    let updates = post_orders.iter().filter_map(|entry| {
        let order = i32::try_from(entry.order).ok()?;
        Some(stores.posts.set_series_order(&entry.post_id, order))
    });
    let results: Vec<Result<(), DbError>> = join_all(updates).await;
    if let Some(err) = results.into_iter().find_map(Result::err) {
        return Err(SeriesError::OrderUpdateFailed(err));
    }

    info!("Reordered {} posts in series {series_id}", post_orders.len());
    Ok(SuccessResponse { success: true })
}

/// Appends a post at the end of a series (`max + 1`, `0` for an empty series).
///
/// Read-then-write without a lock, two concurrent appends can get the same order.
#[instrument(skip(stores))]
pub async fn add_post_to_series(
    stores: &Stores,
    caller: Caller,
    post_id: &str,
    series_id: &str,
) -> Result<Post, SeriesError> {
    ensure_can_write(caller)?;

    let (post, series) = tokio::join!(
        stores.posts.find_by_id(post_id),
        stores.series.find_by_id(series_id),
    );
    if post?.is_none() {
        return Err(SeriesError::PostNotFound(post_id.to_owned()));
    }
    if series?.is_none() {
        return Err(SeriesError::NotFound(series_id.to_owned()));
    }

    let max_order = stores.posts.max_series_order(series_id).await?;
    let order = max_order
        .unwrap_or(-1)
        .checked_add(1)
        .ok_or_else(|| SeriesError::Validation(vec!["series order overflow".to_owned()]))?;

    match stores
        .posts
        .set_membership(post_id, Some((series_id, order)))
        .await
    {
        Err(DbError::RowNotFound) => Err(SeriesError::PostNotFound(post_id.to_owned())),
        result => Ok(result?),
    }
}

/// Clears the series reference and the order. Remaining members are not renumbered.
#[instrument(skip(stores))]
pub async fn remove_post_from_series(
    stores: &Stores,
    caller: Caller,
    post_id: &str,
) -> Result<Post, SeriesError> {
    ensure_can_write(caller)?;
    if stores.posts.find_by_id(post_id).await?.is_none() {
        return Err(SeriesError::PostNotFound(post_id.to_owned()));
    }

    match stores.posts.set_membership(post_id, None).await {
        Err(DbError::RowNotFound) => Err(SeriesError::PostNotFound(post_id.to_owned())),
        result => Ok(result?),
    }
}

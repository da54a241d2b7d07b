use crate::api::auth::caller::Caller;
use crate::api::posts::error::PostError;
use crate::api::posts::interfaces::CreatePostRequest;
use crate::api::series::validation::is_valid_slug;
use crate::database::{NewPost, Post, Stores};
use crate::utils::nice_id;
use tracing::{info, instrument};

/// Registers a post so it can be attached to a series.
#[instrument(skip(stores))]
pub async fn create_post(
    stores: &Stores,
    caller: Caller,
    id_length: usize,
    request: CreatePostRequest,
) -> Result<Post, PostError> {
    if !caller.can_write() {
        return Err(PostError::PermissionDenied);
    }
    let mut violations = Vec::new();
    if request.title.trim().is_empty() {
        violations.push("title must not be empty".to_owned());
    }
    if !is_valid_slug(&request.slug) {
        violations.push(
            "slug may only contain lowercase letters, digits and single hyphens".to_owned(),
        );
    }
    if !violations.is_empty() {
        return Err(PostError::Validation(violations));
    }

    let post = stores
        .posts
        .create(NewPost {
            id: nice_id(id_length),
            title: request.title,
            slug: request.slug,
            published: request.published,
        })
        .await?;
    info!("Created post {}", post.id);
    Ok(post)
}

#[instrument(skip(stores))]
pub async fn get_post(stores: &Stores, id: &str) -> Result<Post, PostError> {
    stores
        .posts
        .find_by_id(id)
        .await?
        .ok_or_else(|| PostError::NotFound(id.to_owned()))
}

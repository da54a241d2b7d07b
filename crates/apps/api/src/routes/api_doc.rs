use crate::routes::{posts, root, series, upload};
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::{Modify, OpenApi};

#[derive(OpenApi)]
#[openapi(
    paths(
        root::handlers::root,
        root::handlers::health_check,
        // Series handlers
        series::handlers::list_series_handler,
        series::handlers::create_series_handler,
        series::handlers::list_published_series_handler,
        series::handlers::get_series_by_slug_handler,
        series::handlers::get_series_handler,
        series::handlers::update_series_handler,
        series::handlers::delete_series_handler,
        series::handlers::series_action_handler,
        series::handlers::update_series_order_handler,
        // Post handlers
        posts::handlers::create_post_handler,
        posts::handlers::get_post_handler,
        posts::handlers::add_post_to_series_handler,
        posts::handlers::remove_post_from_series_handler,
        // Upload handlers
        upload::handlers::upload_handler,
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Series", description = "Browsing and managing series and their member order"),
        (name = "Posts", description = "Post registry and series membership"),
        (name = "Upload", description = "File uploads"),
        (name = "System", description = "Health check"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        );
    }
}

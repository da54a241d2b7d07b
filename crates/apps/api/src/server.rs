use crate::api_state::ApiContext;
use crate::create_router;
use app_state::AppSettings;
use axum::Router;
use color_eyre::Result;
use color_eyre::eyre::eyre;
use http::{HeaderValue, header};
use std::net::SocketAddr;
use tower_http::cors::{self, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

/// Full application: API routes, static uploads, tracing and CORS.
pub fn build_app(api_state: ApiContext, allowed_origins: &[String]) -> Router {
    let allowed_origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|s| match s.parse() {
            Ok(hv) => Some(hv),
            Err(e) => {
                error!("Invalid CORS origin configured: {} - Error: {}", s, e);
                None
            }
        })
        .collect();

    let cors = CorsLayer::new()
        .allow_methods(cors::Any)
        .allow_origin(allowed_origins)
        .allow_headers([
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            header::ACCEPT,
            header::ORIGIN,
        ]);

    // Locally stored uploads, e.g. /uploads/cat-x1y2.webp
    let upload_route = format!("/{}", api_state.upload.upload.upload_dir_name);
    let serve_dir = ServeDir::new(&api_state.upload.upload.upload_dir);

    create_router(api_state)
        .nest_service(&upload_route, serve_dir)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

pub async fn serve(api_state: ApiContext, settings: &AppSettings) -> Result<()> {
    info!("🚀 Initializing server...");
    let app = build_app(api_state, &settings.api.allowed_origins);

    let addr: SocketAddr = format!("{}:{}", settings.api.host, settings.api.port)
        .parse()
        .map_err(|e| eyre!("Invalid address: {}", e))?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!("🐸 Server listening on http://{}", addr);
    axum::serve(listener, app).await?;
    Ok(())
}

// Library exports for testing and the server binary

pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod utils;

use std::sync::Arc;

use axum::{
    http::{header, HeaderName, HeaderValue, Method},
    routing::get,
    Router,
};
use tower_http::cors::{AllowOrigin, CorsLayer};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<utils::config::AppConfig>,
    pub storage: Arc<services::onelake::OneLakeService>,
}

/// Assemble the API router: CORS, the API-key gate on the file routes, and
/// the open health probe. The binary layers tracing and timeouts on top.
pub fn app_router(app_state: AppState) -> Router {
    let origins: Vec<HeaderValue> = app_state
        .config
        .cors_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    // Explicit origin list from configuration; a wildcard origin together
    // with credentials is rejected by tower-http at runtime.
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([
            header::CONTENT_TYPE,
            HeaderName::from_static(middleware::auth::API_KEY_HEADER),
        ])
        .allow_origin(AllowOrigin::list(origins))
        .allow_credentials(true);

    let api_routes = Router::new()
        .route("/files", get(handlers::files::list_files))
        .route("/files/:filename", get(handlers::files::download_file))
        .route_layer(axum::middleware::from_fn_with_state(
            app_state.clone(),
            middleware::auth::require_api_key,
        ));

    Router::new()
        .route("/health", get(handlers::health::health_check))
        .nest("/api", api_routes)
        .with_state(app_state)
        .layer(cors)
}

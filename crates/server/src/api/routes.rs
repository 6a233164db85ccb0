use axum::{middleware, routing::get, Router};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use super::{download, handlers, manifest, subtitles};
use crate::metrics;
use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    // Addon-facing surface at the root; operational endpoints under /api/v1.
    let api_routes = Router::new()
        .route("/health", get(handlers::health))
        .route("/config", get(handlers::get_config));

    Router::new()
        .route("/manifest.json", get(manifest::manifest))
        .route("/subtitles/{kind}/{id}", get(subtitles::search))
        .route("/download/{provider}/{file}", get(download::download))
        .nest("/api/v1", api_routes)
        .route("/metrics", get(metrics::metrics_handler))
        .layer(middleware::from_fn(metrics::track_requests))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

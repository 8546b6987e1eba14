//! Router configuration for the HTTP API.
//!
//! Sets up all routes and middleware (CORS, compression, tracing).

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers;
use super::state::AppState;

/// Upper bound for request bodies; stream batches are the largest payloads.
const MAX_BODY_BYTES: usize = 5 * 1024 * 1024;

/// Create the main application router with all routes and middleware.
pub fn create_router(state: AppState) -> Router {
    // Permissive CORS for the dashboard frontend
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_v1 = Router::new()
        // Buildings
        .route("/buildings", get(handlers::list_buildings))
        .route("/buildings/{id}", get(handlers::get_building))
        .route("/buildings/{id}/alternatives", get(handlers::get_alternatives))
        .route("/quiet-spots", get(handlers::get_quiet_spots))
        .route("/accessibility", get(handlers::get_accessible_buildings))
        .route("/route", get(handlers::get_route))
        .route("/stats", get(handlers::get_stats))
        // Reports and trends
        .route("/reports", get(handlers::list_reports).post(handlers::create_report))
        .route("/trends", get(handlers::get_trends))
        .route("/hotspots", get(handlers::get_hotspots))
        .route("/stream", post(handlers::ingest_stream))
        // Forecasts and chat
        .route("/predictions", get(handlers::get_predictions))
        .route("/chat", post(handlers::chat));

    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/v1", api_v1)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

//! API Routes
//!
//! Configures the Axum router with all relay endpoints.

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    categories_handler, clear_cache_handler, export_handler, health_handler,
    node_templates_handler, search_handler, stats_handler, template_handler, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `GET /health` - Relay and upstream health report
/// - `GET /api/templates/search` - Search the catalog
/// - `GET /api/templates/:id` - Template detail with workflow JSON
/// - `GET /api/nodes/:node_type/templates` - Templates using a node type
/// - `GET /api/categories` - Category listing
/// - `POST /api/export` - Bundle templates for import
/// - `GET /api/cache/stats` - Cache statistics
/// - `POST /api/cache/clear` - Drop all cached entries
///
/// # Middleware
/// - CORS: Allows any origin (configurable for production)
/// - Tracing: Logs all requests for debugging
pub fn create_router(state: AppState) -> Router {
    // Configure CORS middleware
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Build router with all endpoints
    Router::new()
        .route("/health", get(health_handler))
        .route("/api/templates/search", get(search_handler))
        .route("/api/templates/:id", get(template_handler))
        .route("/api/nodes/:node_type/templates", get(node_templates_handler))
        .route("/api/categories", get(categories_handler))
        .route("/api/export", post(export_handler))
        .route("/api/cache/stats", get(stats_handler))
        .route("/api/cache/clear", post(clear_cache_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

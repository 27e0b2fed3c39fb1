//! API Routes
//!
//! Configures the Axum router with all cache endpoints.

use axum::{
    routing::{delete, get, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    configure_handler, delete_object_handler, get_object_handler, health_handler,
    put_object_handler, stats_handler, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `GET /cache/object/:key` - Retrieve a value
/// - `POST /cache/object/:key?ttl=<secs>` - Store a value
/// - `DELETE /cache/object/:key/delete` - Delete a value
/// - `PUT /cache/config` - Reconnect with a new store address and policy
/// - `GET /stats` - Engine statistics
/// - `GET /health` - Health check endpoint
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

    Router::new()
        .route(
            "/cache/object/:key",
            get(get_object_handler).post(put_object_handler),
        )
        .route("/cache/object/:key/delete", delete(delete_object_handler))
        .route("/cache/config", put(configure_handler))
        .route("/stats", get(stats_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

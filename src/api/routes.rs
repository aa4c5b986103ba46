//! API Routes
//!
//! Configures the Axum router with all endpoints.

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    add_student_handler, get_student_handler, get_student_with_class_handler, health_handler,
    reset_cache_handler, stats_handler, update_class_name_handler, update_student_name_handler,
    AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `GET /students/:id` - Read a student through the caches
/// - `GET /students/:id/with-class` - Read a student joined with its class
/// - `POST /students` - Insert a student
/// - `PUT /students/:id/name` - Rename a student
/// - `PUT /classes/:id/name` - Rename a class
/// - `GET /stats` - Per-namespace cache statistics
/// - `DELETE /caches/:namespace` - Reset one second-level cache
/// - `GET /health` - Health check endpoint
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/students", post(add_student_handler))
        .route("/students/:id", get(get_student_handler))
        .route("/students/:id/with-class", get(get_student_with_class_handler))
        .route("/students/:id/name", put(update_student_name_handler))
        .route("/classes/:id/name", put(update_class_name_handler))
        .route("/stats", get(stats_handler))
        .route("/caches/:namespace", delete(reset_cache_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

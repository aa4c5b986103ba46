//! API Module
//!
//! HTTP handlers and routing over a session factory.
//!
//! # Endpoints
//! - `GET /students/:id`, `GET /students/:id/with-class` - Cached reads
//! - `POST /students`, `PUT /students/:id/name`, `PUT /classes/:id/name` - Mutations
//! - `GET /stats` - Per-namespace cache statistics
//! - `DELETE /caches/:namespace` - Reset a second-level cache
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;

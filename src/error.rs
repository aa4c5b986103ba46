//! Error types for the query cache
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::datasource::DataSourceError;

// == Cache Error Enum ==
/// Unified error type for sessions, the cache registry and the HTTP layer.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Operation attempted on a session in the wrong lifecycle state
    #[error("Illegal state: {0}")]
    IllegalState(String),

    /// Failure reported by the data source, propagated unchanged
    #[error(transparent)]
    DataSource(#[from] DataSourceError),

    /// A cache-ref binding contradicts an existing namespace binding
    #[error("Alias conflict: {0}")]
    AliasConflict(String),

    /// A row returned by the data source does not decode into its entity
    #[error("Malformed row: {0}")]
    MalformedRow(String),

    /// Requested row or namespace does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

// == IntoResponse Implementation ==
impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        let status = match &self {
            CacheError::IllegalState(_) => StatusCode::CONFLICT,
            CacheError::DataSource(_) => StatusCode::BAD_GATEWAY,
            CacheError::AliasConflict(_) => StatusCode::CONFLICT,
            CacheError::MalformedRow(_) => StatusCode::INTERNAL_SERVER_ERROR,
            CacheError::NotFound(_) => StatusCode::NOT_FOUND,
            CacheError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
        };

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the query cache.
pub type Result<T> = std::result::Result<T, CacheError>;

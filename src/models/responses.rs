//! Response DTOs for the HTTP API
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;

use crate::cache::NamespaceStats;

/// Response body for mutating endpoints
#[derive(Debug, Clone, Serialize)]
pub struct MutationResponse {
    /// Number of rows the statement affected
    pub affected_rows: u64,
}

impl MutationResponse {
    pub fn new(affected_rows: u64) -> Self {
        Self { affected_rows }
    }
}

/// Response body for DELETE /caches/:namespace
#[derive(Debug, Clone, Serialize)]
pub struct ResetResponse {
    pub message: String,
    pub namespace: String,
}

impl ResetResponse {
    pub fn new(namespace: impl Into<String>) -> Self {
        let namespace = namespace.into();
        Self {
            message: format!("Cache for '{}' reset successfully", namespace),
            namespace,
        }
    }
}

/// Call counters of the backing data source
#[derive(Debug, Clone, Serialize)]
pub struct DataSourceStats {
    pub queries: u64,
    pub executes: u64,
}

/// Response body for the stats endpoint (GET /stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    /// One entry per distinct second-level cache
    pub caches: Vec<NamespaceStats>,
    pub data_source: DataSourceStats,
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

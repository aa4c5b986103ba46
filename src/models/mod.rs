//! Data models
//!
//! Row types served by the demo data source, and the DTOs used for
//! serializing/deserializing HTTP request and response bodies.

pub mod entities;
pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use entities::{ClassInfo, NewStudent, Student, StudentWithClass};
pub use requests::{AddStudentRequest, UpdateNameRequest};
pub use responses::{
    DataSourceStats, HealthResponse, MutationResponse, ResetResponse, StatsResponse,
};

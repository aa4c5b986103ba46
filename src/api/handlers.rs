//! API Handlers
//!
//! Every request runs in its own session, closed before the response is sent.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};

use crate::cache::Namespace;
use crate::config::Config;
use crate::datasource::InMemoryDataSource;
use crate::error::{CacheError, Result};
use crate::mapper::{ClassMapper, StudentMapper};
use crate::models::{
    AddStudentRequest, DataSourceStats, HealthResponse, MutationResponse, ResetResponse,
    StatsResponse, Student, StudentWithClass, UpdateNameRequest,
};
use crate::session::SessionFactory;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub factory: Arc<SessionFactory>,
    pub store: Arc<InMemoryDataSource>,
}

impl AppState {
    /// Creates a new AppState over an existing factory and its store.
    pub fn new(factory: SessionFactory, store: Arc<InMemoryDataSource>) -> Self {
        Self {
            factory: Arc::new(factory),
            store,
        }
    }

    /// Creates a new AppState from configuration over a seeded in-memory store.
    pub fn from_config(config: Config) -> Result<Self> {
        let store = Arc::new(InMemoryDataSource::seeded());
        let factory = SessionFactory::from_config(config, store.clone())?;
        Ok(Self::new(factory, store))
    }
}

/// Handler for GET /students/:id
pub async fn get_student_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Student>> {
    let mut session = state.factory.open_session(true);
    let student = StudentMapper::new(&mut session).get_student_by_id(id).await?;
    session.close()?;

    student
        .map(Json)
        .ok_or_else(|| CacheError::NotFound(format!("student {}", id)))
}

/// Handler for GET /students/:id/with-class
pub async fn get_student_with_class_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<StudentWithClass>> {
    let mut session = state.factory.open_session(true);
    let student = StudentMapper::new(&mut session)
        .get_student_by_id_with_class_info(id)
        .await?;
    session.close()?;

    student
        .map(Json)
        .ok_or_else(|| CacheError::NotFound(format!("student {}", id)))
}

/// Handler for POST /students
pub async fn add_student_handler(
    State(state): State<AppState>,
    Json(req): Json<AddStudentRequest>,
) -> Result<Json<MutationResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    let mut session = state.factory.open_session(false);
    let affected = StudentMapper::new(&mut session)
        .add_student(&req.into_new_student())
        .await?;
    session.commit()?;
    session.close()?;

    Ok(Json(MutationResponse::new(affected)))
}

/// Handler for PUT /students/:id/name
pub async fn update_student_name_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateNameRequest>,
) -> Result<Json<MutationResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    let mut session = state.factory.open_session(false);
    let affected = StudentMapper::new(&mut session)
        .update_student_name(&req.name, id)
        .await?;
    session.commit()?;
    session.close()?;

    Ok(Json(MutationResponse::new(affected)))
}

/// Handler for PUT /classes/:id/name
pub async fn update_class_name_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateNameRequest>,
) -> Result<Json<MutationResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    let mut session = state.factory.open_session(false);
    let affected = ClassMapper::new(&mut session)
        .update_class_name(&req.name, id)
        .await?;
    session.commit()?;
    session.close()?;

    Ok(Json(MutationResponse::new(affected)))
}

/// Handler for GET /stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(StatsResponse {
        caches: state.factory.cache_manager().stats(),
        data_source: DataSourceStats {
            queries: state.store.query_count(),
            executes: state.store.execute_count(),
        },
    })
}

/// Handler for DELETE /caches/:namespace
pub async fn reset_cache_handler(
    State(state): State<AppState>,
    Path(namespace): Path<String>,
) -> Result<Json<ResetResponse>> {
    state
        .factory
        .cache_manager()
        .reset(&Namespace::from(namespace.as_str()))?;
    Ok(Json(ResetResponse::new(namespace)))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}

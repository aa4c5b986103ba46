//! Query Cache - session-scoped and namespace-scoped query caching
//!
//! Sessions resolve reads through a private first-level cache, a shared
//! second-level cache per namespace, and finally the data source.

pub mod api;
pub mod cache;
pub mod config;
pub mod datasource;
pub mod error;
pub mod mapper;
pub mod models;
pub mod session;
pub mod tasks;

pub use api::AppState;
pub use cache::{CacheManager, L1Cache, L2Cache, Namespace, QuerySignature};
pub use config::{Config, LocalCacheScope};
pub use datasource::{DataSource, DataSourceError, InMemoryDataSource, Mutation, Row};
pub use error::{CacheError, Result};
pub use session::{Session, SessionFactory, SessionState};
pub use tasks::spawn_flush_interval_task;

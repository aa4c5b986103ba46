//! Data Source Module
//!
//! The authoritative store that sits behind both cache tiers. Sessions call it
//! only on a cache miss or to execute a mutation.

mod memory;

use std::fmt;

use async_trait::async_trait;
use thiserror::Error;

use crate::cache::{Namespace, Param, QuerySignature};

pub use memory::InMemoryDataSource;

/// A query result. Missing rows are `Null`.
pub type Row = serde_json::Value;

// == Data Source Error ==
/// Failures reported by a data source.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DataSourceError {
    #[error("Data source unavailable: {0}")]
    Unavailable(String),

    #[error("Unknown statement: {0}")]
    UnknownStatement(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}

// == Mutation ==
/// A mutating statement bound to a namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mutation {
    namespace: Namespace,
    statement_id: String,
    parameters: Vec<Param>,
    bound_sql: String,
}

impl Mutation {
    pub fn new(
        namespace: impl Into<Namespace>,
        statement_id: impl Into<String>,
        bound_sql: impl Into<String>,
    ) -> Self {
        Self {
            namespace: namespace.into(),
            statement_id: statement_id.into(),
            parameters: Vec::new(),
            bound_sql: bound_sql.into(),
        }
    }

    /// Appends a bound parameter.
    pub fn param(mut self, value: impl Into<Param>) -> Self {
        self.parameters.push(value.into());
        self
    }

    pub fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    pub fn statement_id(&self) -> &str {
        &self.statement_id
    }

    pub fn parameters(&self) -> &[Param] {
        &self.parameters
    }

    pub fn bound_sql(&self) -> &str {
        &self.bound_sql
    }
}

impl fmt::Display for Mutation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}(", self.namespace, self.statement_id)?;
        for (i, p) in self.parameters.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", p)?;
        }
        f.write_str(")")
    }
}

// == Data Source Trait ==
/// Executes reads and writes against persistent storage.
#[async_trait]
pub trait DataSource: Send + Sync {
    /// Runs a read and returns its result.
    async fn query(&self, signature: &QuerySignature) -> Result<Row, DataSourceError>;

    /// Runs a mutation and returns the number of affected rows.
    async fn execute(&self, mutation: &Mutation) -> Result<u64, DataSourceError>;
}

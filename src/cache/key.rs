//! Cache Key Module
//!
//! Namespaces, statement parameters and the deterministic query signature
//! used as the key in both cache tiers.

use std::fmt;

// == Namespace ==
/// Logical cache partition, normally one per mapper.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Namespace(String);

impl Namespace {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Namespace {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for Namespace {
    fn from(name: String) -> Self {
        Self(name)
    }
}

// == Param ==
/// A bound statement parameter.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Param {
    Int(i64),
    Text(String),
    Null,
}

impl Param {
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Param::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Param::Text(v) => Some(v),
            _ => None,
        }
    }
}

impl fmt::Display for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Param::Int(v) => write!(f, "{}", v),
            Param::Text(v) => write!(f, "{:?}", v),
            Param::Null => f.write_str("null"),
        }
    }
}

impl From<i64> for Param {
    fn from(v: i64) -> Self {
        Param::Int(v)
    }
}

impl From<&str> for Param {
    fn from(v: &str) -> Self {
        Param::Text(v.to_string())
    }
}

impl From<String> for Param {
    fn from(v: String) -> Self {
        Param::Text(v)
    }
}

impl<T: Into<Param>> From<Option<T>> for Param {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Param::Null)
    }
}

// == Query Signature ==
/// Deterministic key identifying one query execution.
///
/// Two signatures are equal exactly when namespace, statement id, parameters,
/// result handler and bound SQL are all equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QuerySignature {
    namespace: Namespace,
    statement_id: String,
    parameters: Vec<Param>,
    result_handler: Option<String>,
    bound_sql: String,
}

impl QuerySignature {
    pub fn new(
        namespace: impl Into<Namespace>,
        statement_id: impl Into<String>,
        bound_sql: impl Into<String>,
    ) -> Self {
        Self {
            namespace: namespace.into(),
            statement_id: statement_id.into(),
            parameters: Vec::new(),
            result_handler: None,
            bound_sql: bound_sql.into(),
        }
    }

    /// Appends a bound parameter.
    pub fn param(mut self, value: impl Into<Param>) -> Self {
        self.parameters.push(value.into());
        self
    }

    /// Sets the result handler id that shapes the result.
    pub fn result_handler(mut self, id: impl Into<String>) -> Self {
        self.result_handler = Some(id.into());
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

impl fmt::Display for QuerySignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}(", self.namespace, self.statement_id)?;
        for (i, p) in self.parameters.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", p)?;
        }
        f.write_str(")")?;
        if let Some(handler) = &self.result_handler {
            write!(f, " -> {}", handler)?;
        }
        Ok(())
    }
}

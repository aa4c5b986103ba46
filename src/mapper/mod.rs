//! Mapper Module
//!
//! Typed facades that turn method calls into query signatures and mutations
//! against a borrowed session.

mod class;
mod student;

pub use class::ClassMapper;
pub use student::StudentMapper;

/// Namespace of the student mapper
pub const STUDENT_NAMESPACE: &str = "mapper.StudentMapper";

/// Namespace of the class mapper
pub const CLASS_NAMESPACE: &str = "mapper.ClassMapper";

/// Statement ids understood by the in-memory data source.
pub mod statements {
    pub const GET_STUDENT_BY_ID: &str = "getStudentById";
    pub const GET_STUDENT_BY_ID_WITH_CLASS_INFO: &str = "getStudentByIdWithClassInfo";
    pub const ADD_STUDENT: &str = "addStudent";
    pub const UPDATE_STUDENT_NAME: &str = "updateStudentName";
    pub const UPDATE_CLASS_NAME: &str = "updateClassName";
}

use crate::datasource::Row;
use crate::error::{CacheError, Result};

/// Decodes an optional row into `T`; `Null` becomes `None`.
fn decode<T: serde::de::DeserializeOwned>(row: Row) -> Result<Option<T>> {
    if row.is_null() {
        return Ok(None);
    }
    serde_json::from_value(row)
        .map(Some)
        .map_err(|e| CacheError::MalformedRow(e.to_string()))
}

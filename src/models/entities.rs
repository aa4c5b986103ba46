//! Row types served by the demo data source.

use serde::{Deserialize, Serialize};

/// A student row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    pub id: i64,
    pub name: String,
    pub age: i64,
    #[serde(default)]
    pub class_id: Option<i64>,
}

/// A class row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassInfo {
    pub id: i64,
    pub name: String,
}

/// A student joined with the name of its class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentWithClass {
    #[serde(flatten)]
    pub student: Student,
    pub class_name: Option<String>,
}

/// Fields of a student to insert; the id is assigned by the store.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewStudent {
    pub name: String,
    pub age: i64,
    #[serde(default)]
    pub class_id: Option<i64>,
}

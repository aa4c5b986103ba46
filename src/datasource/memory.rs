//! In-memory data source backing the student and class mappers.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use async_trait::async_trait;
use parking_lot::RwLock;
use tracing::debug;

use super::{DataSource, DataSourceError, Mutation, Row};
use crate::cache::{Param, QuerySignature};
use crate::mapper::statements;
use crate::models::{ClassInfo, Student, StudentWithClass};

#[derive(Debug, Default)]
struct Tables {
    students: BTreeMap<i64, Student>,
    classes: BTreeMap<i64, ClassInfo>,
}

/// Student/class tables held in memory.
///
/// Counts every call so callers can tell whether a read reached the store.
#[derive(Debug, Default)]
pub struct InMemoryDataSource {
    tables: RwLock<Tables>,
    queries: AtomicU64,
    executes: AtomicU64,
    fail_next: AtomicBool,
}

impl InMemoryDataSource {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store holding student 1 in class 1.
    pub fn seeded() -> Self {
        let store = Self::new();
        store.insert_class(ClassInfo {
            id: 1,
            name: "一班".to_string(),
        });
        store.insert_student(Student {
            id: 1,
            name: "点点".to_string(),
            age: 16,
            class_id: Some(1),
        });
        store
    }

    pub fn insert_student(&self, student: Student) {
        self.tables.write().students.insert(student.id, student);
    }

    pub fn insert_class(&self, class: ClassInfo) {
        self.tables.write().classes.insert(class.id, class);
    }

    /// Number of reads that reached the store.
    pub fn query_count(&self) -> u64 {
        self.queries.load(Ordering::SeqCst)
    }

    /// Number of mutations that reached the store.
    pub fn execute_count(&self) -> u64 {
        self.executes.load(Ordering::SeqCst)
    }

    /// Makes the next query or execute fail with `Unavailable`.
    pub fn fail_next(&self) {
        self.fail_next.store(true, Ordering::SeqCst);
    }

    fn check_failure(&self) -> Result<(), DataSourceError> {
        if self.fail_next.swap(false, Ordering::SeqCst) {
            return Err(DataSourceError::Unavailable("injected failure".to_string()));
        }
        Ok(())
    }

    fn student_by_id(&self, id: i64) -> Result<Row, DataSourceError> {
        let tables = self.tables.read();
        to_row(tables.students.get(&id))
    }

    fn student_with_class(&self, id: i64) -> Result<Row, DataSourceError> {
        let tables = self.tables.read();
        let joined = tables.students.get(&id).map(|student| StudentWithClass {
            class_name: student
                .class_id
                .and_then(|cid| tables.classes.get(&cid))
                .map(|c| c.name.clone()),
            student: student.clone(),
        });
        to_row(joined.as_ref())
    }

    fn add_student(&self, params: &[Param]) -> Result<u64, DataSourceError> {
        let name = text_param(params, 0)?;
        let age = int_param(params, 1)?;
        let class_id = params.get(2).and_then(Param::as_int);

        let mut tables = self.tables.write();
        let id = tables.students.keys().next_back().map_or(1, |last| last + 1);
        tables.students.insert(
            id,
            Student {
                id,
                name: name.to_string(),
                age,
                class_id,
            },
        );
        Ok(1)
    }

    fn update_student_name(&self, params: &[Param]) -> Result<u64, DataSourceError> {
        let name = text_param(params, 0)?;
        let id = int_param(params, 1)?;

        let mut tables = self.tables.write();
        Ok(match tables.students.get_mut(&id) {
            Some(student) => {
                student.name = name.to_string();
                1
            }
            None => 0,
        })
    }

    fn update_class_name(&self, params: &[Param]) -> Result<u64, DataSourceError> {
        let name = text_param(params, 0)?;
        let id = int_param(params, 1)?;

        let mut tables = self.tables.write();
        Ok(match tables.classes.get_mut(&id) {
            Some(class) => {
                class.name = name.to_string();
                1
            }
            None => 0,
        })
    }
}

#[async_trait]
impl DataSource for InMemoryDataSource {
    async fn query(&self, signature: &QuerySignature) -> Result<Row, DataSourceError> {
        self.check_failure()?;
        self.queries.fetch_add(1, Ordering::SeqCst);
        debug!("==> Preparing: {}", signature.bound_sql());
        debug!("==> Parameters: {}", signature);

        let id = int_param(signature.parameters(), 0)?;
        match signature.statement_id() {
            statements::GET_STUDENT_BY_ID => self.student_by_id(id),
            statements::GET_STUDENT_BY_ID_WITH_CLASS_INFO => self.student_with_class(id),
            other => Err(DataSourceError::UnknownStatement(other.to_string())),
        }
    }

    async fn execute(&self, mutation: &Mutation) -> Result<u64, DataSourceError> {
        self.check_failure()?;
        self.executes.fetch_add(1, Ordering::SeqCst);
        debug!("==> Preparing: {}", mutation.bound_sql());
        debug!("==> Parameters: {}", mutation);

        let params = mutation.parameters();
        match mutation.statement_id() {
            statements::ADD_STUDENT => self.add_student(params),
            statements::UPDATE_STUDENT_NAME => self.update_student_name(params),
            statements::UPDATE_CLASS_NAME => self.update_class_name(params),
            other => Err(DataSourceError::UnknownStatement(other.to_string())),
        }
    }
}

fn to_row<T: serde::Serialize>(value: Option<&T>) -> Result<Row, DataSourceError> {
    serde_json::to_value(value).map_err(|e| DataSourceError::Unavailable(e.to_string()))
}

fn int_param(params: &[Param], index: usize) -> Result<i64, DataSourceError> {
    params
        .get(index)
        .and_then(Param::as_int)
        .ok_or_else(|| DataSourceError::InvalidParameter(format!("expected integer at {}", index)))
}

fn text_param(params: &[Param], index: usize) -> Result<&str, DataSourceError> {
    params
        .get(index)
        .and_then(Param::as_text)
        .ok_or_else(|| DataSourceError::InvalidParameter(format!("expected text at {}", index)))
}

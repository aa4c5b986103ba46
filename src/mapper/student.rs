//! Student mapper.

use super::{decode, statements, STUDENT_NAMESPACE};
use crate::cache::QuerySignature;
use crate::datasource::Mutation;
use crate::error::Result;
use crate::models::{NewStudent, Student, StudentWithClass};
use crate::session::Session;

/// Student statements bound to one session.
pub struct StudentMapper<'s> {
    session: &'s mut Session,
}

impl<'s> StudentMapper<'s> {
    pub fn new(session: &'s mut Session) -> Self {
        Self { session }
    }

    pub async fn get_student_by_id(&mut self, id: i64) -> Result<Option<Student>> {
        let sig = QuerySignature::new(
            STUDENT_NAMESPACE,
            statements::GET_STUDENT_BY_ID,
            "SELECT id, name, age, class_id FROM student WHERE id = ?",
        )
        .param(id);
        decode(self.session.query(&sig).await?)
    }

    /// Reads a student joined with its class.
    ///
    /// Cached under the student namespace even though it reads class rows.
    pub async fn get_student_by_id_with_class_info(
        &mut self,
        id: i64,
    ) -> Result<Option<StudentWithClass>> {
        let sig = QuerySignature::new(
            STUDENT_NAMESPACE,
            statements::GET_STUDENT_BY_ID_WITH_CLASS_INFO,
            "SELECT s.id, s.name, s.age, s.class_id, c.name AS class_name \
             FROM student s LEFT JOIN class c ON s.class_id = c.id WHERE s.id = ?",
        )
        .param(id);
        decode(self.session.query(&sig).await?)
    }

    pub async fn add_student(&mut self, student: &NewStudent) -> Result<u64> {
        let mutation = Mutation::new(
            STUDENT_NAMESPACE,
            statements::ADD_STUDENT,
            "INSERT INTO student (name, age, class_id) VALUES (?, ?, ?)",
        )
        .param(student.name.as_str())
        .param(student.age)
        .param(student.class_id);
        self.session.mutate(&mutation).await
    }

    pub async fn update_student_name(&mut self, name: &str, id: i64) -> Result<u64> {
        let mutation = Mutation::new(
            STUDENT_NAMESPACE,
            statements::UPDATE_STUDENT_NAME,
            "UPDATE student SET name = ? WHERE id = ?",
        )
        .param(name)
        .param(id);
        self.session.mutate(&mutation).await
    }
}

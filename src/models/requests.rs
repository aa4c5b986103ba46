//! Request DTOs for the HTTP API
//!
//! Defines the structure of incoming HTTP request bodies.

use serde::Deserialize;

use crate::models::NewStudent;

/// Maximum accepted length of a student or class name
pub const MAX_NAME_LENGTH: usize = 64;

fn validate_name(name: &str) -> Option<String> {
    if name.trim().is_empty() {
        return Some("Name cannot be empty".to_string());
    }
    if name.chars().count() > MAX_NAME_LENGTH {
        return Some(format!(
            "Name exceeds maximum length of {} characters",
            MAX_NAME_LENGTH
        ));
    }
    None
}

/// Request body for PUT /students/:id/name and PUT /classes/:id/name
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateNameRequest {
    pub name: String,
}

impl UpdateNameRequest {
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        validate_name(&self.name)
    }
}

/// Request body for POST /students
#[derive(Debug, Clone, Deserialize)]
pub struct AddStudentRequest {
    pub name: String,
    pub age: i64,
    #[serde(default)]
    pub class_id: Option<i64>,
}

impl AddStudentRequest {
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        if let Some(msg) = validate_name(&self.name) {
            return Some(msg);
        }
        if !(0..=150).contains(&self.age) {
            return Some("Age must be between 0 and 150".to_string());
        }
        None
    }

    pub fn into_new_student(self) -> NewStudent {
        NewStudent {
            name: self.name,
            age: self.age,
            class_id: self.class_id,
        }
    }
}

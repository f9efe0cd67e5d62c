//! Partial edit requests and their outcomes.
//!
//! An edit only touches the fields it carries. Blank values count as absent.
//! A malformed age is skipped with a warning instead of failing the edit.

use crate::model::record::RecordKind;
use crate::model::validation::{parse_age, InputField, ValidationError};
use serde::Serialize;
use std::fmt::{Display, Formatter};

/// Marker the legacy edit prompts accept for "keep the current value".
pub const KEEP_CURRENT_MARKER: &str = "NA";

/// Converts one prompt answer into an edit field.
///
/// Returns `None` for blank input and for [`KEEP_CURRENT_MARKER`].
pub fn field_from_prompt(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() || trimmed == KEEP_CURRENT_MARKER {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Field changes for a student or instructor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersonEdit {
    pub name: Option<String>,
    /// Raw age text; parsed when the edit is applied.
    pub age: Option<String>,
    pub email: Option<String>,
}

impl PersonEdit {
    /// Builds an edit from prompt answers that may carry the keep marker.
    pub fn from_prompts(name: &str, age: &str, email: &str) -> Self {
        Self {
            name: field_from_prompt(name),
            age: field_from_prompt(age),
            email: field_from_prompt(email),
        }
    }

    pub(crate) fn resolve(&self) -> ResolvedPersonEdit {
        let mut warnings = Vec::new();
        let age = match supplied(&self.age) {
            Some(text) => match parse_age(text) {
                Ok(age) => Some(age),
                Err(reason) => {
                    warnings.push(EditWarning {
                        field: InputField::Age,
                        reason,
                    });
                    None
                }
            },
            None => None,
        };

        ResolvedPersonEdit {
            name: supplied(&self.name).map(str::to_string),
            age,
            email: supplied(&self.email).map(str::to_string),
            warnings,
        }
    }
}

/// Field changes for a course.
///
/// `instructor_id` is written as given; it is not checked against the
/// instructors table and does not go through the assignment conflict rule.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CourseEdit {
    pub name: Option<String>,
    pub instructor_id: Option<String>,
}

impl CourseEdit {
    pub fn from_prompts(name: &str, instructor_id: &str) -> Self {
        Self {
            name: field_from_prompt(name),
            instructor_id: field_from_prompt(instructor_id),
        }
    }

    pub(crate) fn resolve(&self) -> ResolvedCourseEdit {
        ResolvedCourseEdit {
            name: supplied(&self.name).map(str::to_string),
            instructor_id: supplied(&self.instructor_id).map(str::to_string),
        }
    }
}

/// An edit request for any record kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordEdit {
    Person(PersonEdit),
    Course(CourseEdit),
}

impl RecordEdit {
    pub fn applies_to(&self, kind: RecordKind) -> bool {
        matches!(
            (self, kind),
            (Self::Person(_), RecordKind::Student)
                | (Self::Person(_), RecordKind::Instructor)
                | (Self::Course(_), RecordKind::Course)
        )
    }
}

impl From<PersonEdit> for RecordEdit {
    fn from(value: PersonEdit) -> Self {
        Self::Person(value)
    }
}

impl From<CourseEdit> for RecordEdit {
    fn from(value: CourseEdit) -> Self {
        Self::Course(value)
    }
}

/// A stored column an edit wrote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EditedField {
    Name,
    Age,
    Email,
    InstructorId,
}

/// A supplied field that was skipped because its value was malformed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditWarning {
    pub field: InputField,
    pub reason: ValidationError,
}

impl Display for EditWarning {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}; no changes made to {}", self.reason, self.field)
    }
}

/// Result of a committed edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditOutcome {
    pub kind: RecordKind,
    pub id: String,
    pub applied: Vec<EditedField>,
    pub warnings: Vec<EditWarning>,
}

impl EditOutcome {
    pub(crate) fn new(kind: RecordKind, id: &str) -> Self {
        Self {
            kind,
            id: id.to_string(),
            applied: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// True when the edit changed nothing.
    pub fn is_noop(&self) -> bool {
        self.applied.is_empty()
    }
}

pub(crate) struct ResolvedPersonEdit {
    pub name: Option<String>,
    pub age: Option<i64>,
    pub email: Option<String>,
    pub warnings: Vec<EditWarning>,
}

pub(crate) struct ResolvedCourseEdit {
    pub name: Option<String>,
    pub instructor_id: Option<String>,
}

fn supplied(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

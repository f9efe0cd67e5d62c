//! Record kinds, write inputs and read models.
//!
//! # Invariants
//! - Relation annotations (`course_ids`, `student_ids`) keep storage order
//!   and may contain duplicates, since enrollment is not unique.
//! - `CourseRecord::instructor_id` is `None` only when the stored value is NULL.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// The three record relations a caller can list, search, edit or delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    Student,
    Instructor,
    Course,
}

impl RecordKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Student => "student",
            Self::Instructor => "instructor",
            Self::Course => "course",
        }
    }
}

impl Display for RecordKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecordKind {
    type Err = String;

    /// Accepts singular or plural names, case-insensitive.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "student" | "students" => Ok(Self::Student),
            "instructor" | "instructors" => Ok(Self::Instructor),
            "course" | "courses" => Ok(Self::Course),
            other => Err(format!(
                "unknown record kind `{other}`; expected student|instructor|course"
            )),
        }
    }
}

/// Record kinds that share the person shape (id, name, age, email).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PersonKind {
    Student,
    Instructor,
}

impl From<PersonKind> for RecordKind {
    fn from(value: PersonKind) -> Self {
        match value {
            PersonKind::Student => RecordKind::Student,
            PersonKind::Instructor => RecordKind::Instructor,
        }
    }
}

/// Column a search term is matched against. Matching is always exact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchField {
    Name,
    Id,
}

impl FromStr for SearchField {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "name" => Ok(Self::Name),
            "id" => Ok(Self::Id),
            other => Err(format!("unknown search field `{other}`; expected name|id")),
        }
    }
}

/// Validated input for a new student or instructor row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPerson {
    pub id: String,
    pub name: String,
    pub age: i64,
    pub email: String,
}

/// Validated input for a new course row. Courses start unassigned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCourse {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentRecord {
    pub student_id: String,
    pub name: String,
    pub age: i64,
    pub email: String,
    /// Courses the student is enrolled in.
    pub course_ids: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstructorRecord {
    pub instructor_id: String,
    pub name: String,
    pub age: i64,
    pub email: String,
    /// Courses currently assigned to the instructor.
    pub course_ids: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseRecord {
    pub course_id: String,
    pub name: String,
    pub instructor_id: Option<String>,
    /// Students enrolled in the course.
    pub student_ids: Vec<String>,
}

/// One row returned by kind-generic list/search calls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RecordRow {
    Student(StudentRecord),
    Instructor(InstructorRecord),
    Course(CourseRecord),
}

impl RecordRow {
    pub fn kind(&self) -> RecordKind {
        match self {
            Self::Student(_) => RecordKind::Student,
            Self::Instructor(_) => RecordKind::Instructor,
            Self::Course(_) => RecordKind::Course,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            Self::Student(record) => &record.student_id,
            Self::Instructor(record) => &record.instructor_id,
            Self::Course(record) => &record.course_id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Student(record) => &record.name,
            Self::Instructor(record) => &record.name,
            Self::Course(record) => &record.name,
        }
    }

    pub fn as_student(&self) -> Option<&StudentRecord> {
        match self {
            Self::Student(record) => Some(record),
            _ => None,
        }
    }

    pub fn as_instructor(&self) -> Option<&InstructorRecord> {
        match self {
            Self::Instructor(record) => Some(record),
            _ => None,
        }
    }

    pub fn as_course(&self) -> Option<&CourseRecord> {
        match self {
            Self::Course(record) => Some(record),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{CourseRecord, RecordKind, RecordRow, SearchField};

    #[test]
    fn record_kind_parses_singular_and_plural_names() {
        assert_eq!("Students".parse::<RecordKind>(), Ok(RecordKind::Student));
        assert_eq!(" instructor ".parse::<RecordKind>(), Ok(RecordKind::Instructor));
        assert_eq!("COURSE".parse::<RecordKind>(), Ok(RecordKind::Course));

        let error = "teacher".parse::<RecordKind>().unwrap_err();
        assert!(error.contains("teacher"));
    }

    #[test]
    fn search_field_rejects_unknown_columns() {
        assert_eq!("name".parse::<SearchField>(), Ok(SearchField::Name));
        assert_eq!("ID".parse::<SearchField>(), Ok(SearchField::Id));
        assert!("email".parse::<SearchField>().is_err());
    }

    #[test]
    fn record_row_serializes_with_kind_tag() {
        let row = RecordRow::Course(CourseRecord {
            course_id: "C1".to_string(),
            name: "Algebra".to_string(),
            instructor_id: None,
            student_ids: vec!["S1".to_string()],
        });

        let value = serde_json::to_value(&row).unwrap();
        assert_eq!(value["kind"], "course");
        assert_eq!(value["course_id"], "C1");
        assert!(value["instructor_id"].is_null());
        assert_eq!(value["student_ids"][0], "S1");
    }
}

//! Input parsing and validation rules.
//!
//! # Responsibility
//! - Turn raw form values into validated write inputs.
//! - Report the first broken rule as a typed `ValidationError`.
//!
//! # Invariants
//! - All string inputs are trimmed before checks and before persistence.
//! - Person inputs are checked in form order: name, age, email, id.

use crate::model::record::{NewCourse, NewPerson, PersonKind, RecordKind};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Caller-facing input field, used to point validation messages at a form
/// control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputField {
    StudentId,
    InstructorId,
    CourseId,
    Name,
    CourseName,
    Age,
    Email,
    SearchTerm,
}

impl InputField {
    pub fn label(self) -> &'static str {
        match self {
            Self::StudentId => "student id",
            Self::InstructorId => "instructor id",
            Self::CourseId => "course id",
            Self::Name => "name",
            Self::CourseName => "course name",
            Self::Age => "age",
            Self::Email => "email",
            Self::SearchTerm => "search term",
        }
    }
}

impl Display for InputField {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Malformed or missing caller input. Always recoverable by re-prompting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    EmptyField(InputField),
    InvalidAge(String),
    NonPositiveAge(i64),
    /// Email must contain both `@` and `.`.
    InvalidEmail,
    /// Edit fields were built for a different record kind.
    EditKindMismatch(RecordKind),
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyField(field) => write!(f, "{field} cannot be empty"),
            Self::InvalidAge(value) => write!(f, "age must be a valid integer, got `{value}`"),
            Self::NonPositiveAge(value) => {
                write!(f, "age must be a positive integer, got {value}")
            }
            Self::InvalidEmail => write!(f, "email format is invalid"),
            Self::EditKindMismatch(kind) => {
                write!(f, "edit fields do not apply to {kind} records")
            }
        }
    }
}

impl Error for ValidationError {}

/// Returns the id field label used for a record kind.
pub fn id_field(kind: RecordKind) -> InputField {
    match kind {
        RecordKind::Student => InputField::StudentId,
        RecordKind::Instructor => InputField::InstructorId,
        RecordKind::Course => InputField::CourseId,
    }
}

/// Trims `value` and rejects it when nothing is left.
pub fn require_field(field: InputField, value: &str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyField(field));
    }
    Ok(trimmed.to_string())
}

/// Parses an age value; it must be a positive integer.
pub fn parse_age(value: &str) -> Result<i64, ValidationError> {
    let trimmed = require_field(InputField::Age, value)?;
    let age = trimmed
        .parse::<i64>()
        .map_err(|_| ValidationError::InvalidAge(trimmed.clone()))?;
    if age <= 0 {
        return Err(ValidationError::NonPositiveAge(age));
    }
    Ok(age)
}

pub fn validate_email(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::EmptyField(InputField::Email));
    }
    if !value.contains('@') || !value.contains('.') {
        return Err(ValidationError::InvalidEmail);
    }
    Ok(())
}

/// Parses raw form values for a new student or instructor.
pub fn parse_new_person(
    kind: PersonKind,
    id: &str,
    name: &str,
    age: &str,
    email: &str,
) -> Result<NewPerson, ValidationError> {
    let name = require_field(InputField::Name, name)?;
    let age = parse_age(age)?;
    let email = require_field(InputField::Email, email)?;
    validate_email(&email)?;
    let id = require_field(id_field(kind.into()), id)?;

    Ok(NewPerson {
        id,
        name,
        age,
        email,
    })
}

/// Parses raw form values for a new course.
pub fn parse_new_course(id: &str, name: &str) -> Result<NewCourse, ValidationError> {
    let id = require_field(InputField::CourseId, id)?;
    let name = require_field(InputField::CourseName, name)?;
    Ok(NewCourse { id, name })
}

impl NewPerson {
    /// Re-checks every rule for inputs built without the parser.
    pub fn validate(&self, kind: PersonKind) -> Result<(), ValidationError> {
        require_field(InputField::Name, &self.name)?;
        if self.age <= 0 {
            return Err(ValidationError::NonPositiveAge(self.age));
        }
        validate_email(&self.email)?;
        require_field(id_field(kind.into()), &self.id)?;
        Ok(())
    }
}

impl NewCourse {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_field(InputField::CourseId, &self.id)?;
        require_field(InputField::CourseName, &self.name)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{
        parse_age, parse_new_course, parse_new_person, validate_email, InputField,
        ValidationError,
    };
    use crate::model::record::{NewPerson, PersonKind};

    #[test]
    fn parse_new_person_trims_and_accepts_valid_input() {
        let person =
            parse_new_person(PersonKind::Student, " S1 ", " Ada ", " 21 ", " ada@uni.edu ")
                .unwrap();
        assert_eq!(
            person,
            NewPerson {
                id: "S1".to_string(),
                name: "Ada".to_string(),
                age: 21,
                email: "ada@uni.edu".to_string(),
            }
        );
    }

    #[test]
    fn parse_new_person_reports_rules_in_form_order() {
        let err = parse_new_person(PersonKind::Student, "", "", "abc", "bad").unwrap_err();
        assert_eq!(err, ValidationError::EmptyField(InputField::Name));

        let err = parse_new_person(PersonKind::Student, "", "Ada", "abc", "bad").unwrap_err();
        assert_eq!(err, ValidationError::InvalidAge("abc".to_string()));

        let err = parse_new_person(PersonKind::Student, "", "Ada", "20", "bad").unwrap_err();
        assert_eq!(err, ValidationError::InvalidEmail);

        let err =
            parse_new_person(PersonKind::Instructor, "  ", "Ada", "20", "a@b.com").unwrap_err();
        assert_eq!(err, ValidationError::EmptyField(InputField::InstructorId));
    }

    #[test]
    fn parse_age_rejects_empty_non_numeric_and_non_positive_values() {
        assert_eq!(
            parse_age(""),
            Err(ValidationError::EmptyField(InputField::Age))
        );
        assert_eq!(
            parse_age("4.5"),
            Err(ValidationError::InvalidAge("4.5".to_string()))
        );
        assert_eq!(parse_age("0"), Err(ValidationError::NonPositiveAge(0)));
        assert_eq!(parse_age("-3"), Err(ValidationError::NonPositiveAge(-3)));
        assert_eq!(parse_age("+7"), Ok(7));
    }

    #[test]
    fn validate_email_requires_at_sign_and_dot() {
        assert!(validate_email("a@b.com").is_ok());
        assert_eq!(validate_email("a@bcom"), Err(ValidationError::InvalidEmail));
        assert_eq!(validate_email("ab.com"), Err(ValidationError::InvalidEmail));
        assert_eq!(
            validate_email(" "),
            Err(ValidationError::EmptyField(InputField::Email))
        );
    }

    #[test]
    fn parse_new_course_requires_both_fields() {
        assert_eq!(
            parse_new_course("", "Algebra"),
            Err(ValidationError::EmptyField(InputField::CourseId))
        );
        assert_eq!(
            parse_new_course("C1", " "),
            Err(ValidationError::EmptyField(InputField::CourseName))
        );
        let course = parse_new_course("C1", "Algebra").unwrap();
        assert_eq!(course.id, "C1");
        assert_eq!(course.name, "Algebra");
    }

    #[test]
    fn hand_built_person_is_rechecked() {
        let person = NewPerson {
            id: "I1".to_string(),
            name: "Ann".to_string(),
            age: 0,
            email: "a@b.com".to_string(),
        };
        assert_eq!(
            person.validate(PersonKind::Instructor),
            Err(ValidationError::NonPositiveAge(0))
        );
    }
}

//! Record repository contract, error taxonomy and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD over students, instructors and courses.
//! - Maintain the enrollment and teaching assignment relations.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - Write paths validate their input before any SQL runs.
//! - Registration and assignment require both referenced rows to exist.
//! - A course whose `instructor_id` is not NULL cannot be reassigned.
//! - Deletes never cascade; duplicate enrollments are accepted.
//! - A failed call leaves the database exactly as it was.

use crate::db::DbError;
use crate::model::edit::{EditOutcome, EditedField, RecordEdit};
use crate::model::record::{NewCourse, NewPerson, PersonKind, RecordKind, RecordRow, SearchField};
use crate::model::validation::ValidationError;
use crate::repo::rows::{ensure_exists, query_rows, record_exists, table_spec, TableSpec};
use crate::repo::schema_check::ensure_connection_ready;
use rusqlite::types::ToSql;
use rusqlite::{params, Connection, ErrorCode, OptionalExtension, Transaction, TransactionBehavior};
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

/// Coarse classification of a `RepoError`, for callers that only need to
/// decide how to present a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Caller input is malformed or missing.
    Validation,
    /// A referenced id does not exist.
    NotFound,
    /// Insert collided with an existing id.
    DuplicateKey,
    /// A business rule refused the change.
    Conflict,
    /// The storage engine or schema failed.
    Storage,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::NotFound => "not_found",
            Self::DuplicateKey => "duplicate_key",
            Self::Conflict => "conflict",
            Self::Storage => "storage",
        }
    }
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Business-rule violations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConflictError {
    CourseAlreadyAssigned {
        course_id: String,
        instructor_id: String,
    },
}

impl Display for ConflictError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CourseAlreadyAssigned {
                course_id,
                instructor_id,
            } => write!(
                f,
                "course {course_id} already has an instructor ({instructor_id})"
            ),
        }
    }
}

/// Error returned by every record repository operation.
#[derive(Debug)]
pub enum RepoError {
    Validation(ValidationError),
    NotFound {
        kind: RecordKind,
        id: String,
    },
    DuplicateKey {
        kind: RecordKind,
        id: String,
    },
    Conflict(ConflictError),
    Db(DbError),
    InvalidData(String),
    /// Required table is missing.
    MissingRequiredTable(&'static str),
    /// Required column is missing from expected table.
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl RepoError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::DuplicateKey { .. } => ErrorKind::DuplicateKey,
            Self::Conflict(_) => ErrorKind::Conflict,
            Self::Db(_)
            | Self::InvalidData(_)
            | Self::MissingRequiredTable(_)
            | Self::MissingRequiredColumn { .. } => ErrorKind::Storage,
        }
    }

    /// Stable machine-readable code for logs.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation_failed",
            Self::NotFound { .. } => "record_not_found",
            Self::DuplicateKey { .. } => "duplicate_key",
            Self::Conflict(ConflictError::CourseAlreadyAssigned { .. }) => {
                "course_already_assigned"
            }
            Self::Db(_) => "db_error",
            Self::InvalidData(_) => "invalid_data",
            Self::MissingRequiredTable(_) => "missing_table",
            Self::MissingRequiredColumn { .. } => "missing_column",
        }
    }
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::NotFound { kind, id } => write!(f, "{kind} not found: {id}"),
            Self::DuplicateKey { kind, id } => write!(f, "{kind} already exists: {id}"),
            Self::Conflict(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted record data: {message}"),
            Self::MissingRequiredTable(table) => write!(f, "required table missing: {table}"),
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "required column missing: {table}.{column}")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::NotFound { .. }
            | Self::DuplicateKey { .. }
            | Self::Conflict(_)
            | Self::InvalidData(_)
            | Self::MissingRequiredTable(_)
            | Self::MissingRequiredColumn { .. } => None,
        }
    }
}

impl From<ValidationError> for RepoError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<ConflictError> for RepoError {
    fn from(value: ConflictError) -> Self {
        Self::Conflict(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Repository interface for school record operations.
///
/// Ids passed in are expected to be trimmed and non-empty; the service
/// layer takes care of that for raw caller input.
pub trait RecordRepository {
    /// Inserts one student or instructor row.
    fn insert_person(&mut self, kind: PersonKind, person: &NewPerson) -> RepoResult<()>;
    /// Inserts one course row with no instructor.
    fn insert_course(&mut self, course: &NewCourse) -> RepoResult<()>;
    /// Returns every course id in insertion order.
    fn list_course_ids(&self) -> RepoResult<Vec<String>>;
    /// Adds one enrollment row; duplicates are allowed.
    fn enroll_student(&mut self, student_id: &str, course_id: &str) -> RepoResult<()>;
    /// Sets the instructor of an unassigned course.
    ///
    /// The course is checked first, so an assigned course reports
    /// `Conflict` even when the requested instructor does not exist.
    fn assign_instructor(&mut self, instructor_id: &str, course_id: &str) -> RepoResult<()>;
    /// Returns all rows of one kind with relation annotations.
    fn list_records(&self, kind: RecordKind) -> RepoResult<Vec<RecordRow>>;
    /// Returns rows whose id or name equals `term` exactly.
    fn find_records(
        &self,
        kind: RecordKind,
        field: SearchField,
        term: &str,
    ) -> RepoResult<Vec<RecordRow>>;
    /// Applies the supplied fields of `edit` to one row.
    fn apply_edit(
        &mut self,
        kind: RecordKind,
        id: &str,
        edit: &RecordEdit,
    ) -> RepoResult<EditOutcome>;
    /// Deletes one row without touching rows that reference it.
    fn delete_record(&mut self, kind: RecordKind, id: &str) -> RepoResult<()>;
}

/// SQLite-backed record repository.
pub struct SqliteRecordRepository<'conn> {
    conn: &'conn mut Connection,
}

impl<'conn> SqliteRecordRepository<'conn> {
    /// Constructs a repository after checking the connection carries the
    /// required tables and columns.
    pub fn try_new(conn: &'conn mut Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }

    /// Constructs a repository on a connection already known to be ready.
    pub(crate) fn from_ready(conn: &'conn mut Connection) -> Self {
        Self { conn }
    }

    fn begin(&mut self) -> RepoResult<Transaction<'_>> {
        Ok(self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?)
    }
}

impl RecordRepository for SqliteRecordRepository<'_> {
    fn insert_person(&mut self, kind: PersonKind, person: &NewPerson) -> RepoResult<()> {
        person.validate(kind)?;
        let record_kind = RecordKind::from(kind);
        let spec = table_spec(record_kind);

        let tx = self.begin()?;
        if record_exists(&tx, record_kind, &person.id)? {
            return Err(RepoError::DuplicateKey {
                kind: record_kind,
                id: person.id.clone(),
            });
        }

        tx.execute(
            &format!(
                "INSERT INTO {} ({}, name, age, email) VALUES (?1, ?2, ?3, ?4);",
                spec.table, spec.id_column
            ),
            params![
                person.id.as_str(),
                person.name.as_str(),
                person.age,
                person.email.as_str(),
            ],
        )
        .map_err(|err| map_insert_error(err, record_kind, &person.id))?;

        tx.commit()?;
        Ok(())
    }

    fn insert_course(&mut self, course: &NewCourse) -> RepoResult<()> {
        course.validate()?;

        let tx = self.begin()?;
        if record_exists(&tx, RecordKind::Course, &course.id)? {
            return Err(RepoError::DuplicateKey {
                kind: RecordKind::Course,
                id: course.id.clone(),
            });
        }

        tx.execute(
            "INSERT INTO courses (course_id, course_name) VALUES (?1, ?2);",
            params![course.id.as_str(), course.name.as_str()],
        )
        .map_err(|err| map_insert_error(err, RecordKind::Course, &course.id))?;

        tx.commit()?;
        Ok(())
    }

    fn list_course_ids(&self) -> RepoResult<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT course_id FROM courses ORDER BY rowid ASC;")?;
        let mut rows = stmt.query([])?;
        let mut ids = Vec::new();
        while let Some(row) = rows.next()? {
            ids.push(row.get("course_id")?);
        }
        Ok(ids)
    }

    fn enroll_student(&mut self, student_id: &str, course_id: &str) -> RepoResult<()> {
        let tx = self.begin()?;
        ensure_exists(&tx, RecordKind::Student, student_id)?;
        ensure_exists(&tx, RecordKind::Course, course_id)?;

        tx.execute(
            "INSERT INTO student_courses (student_id, course_id) VALUES (?1, ?2);",
            params![student_id, course_id],
        )?;

        tx.commit()?;
        Ok(())
    }

    fn assign_instructor(&mut self, instructor_id: &str, course_id: &str) -> RepoResult<()> {
        let tx = self.begin()?;
        let current: Option<String> = tx
            .query_row(
                "SELECT instructor_id FROM courses WHERE course_id = ?1;",
                [course_id],
                |row| row.get(0),
            )
            .optional()?
            .ok_or_else(|| RepoError::NotFound {
                kind: RecordKind::Course,
                id: course_id.to_string(),
            })?;

        if let Some(existing) = current {
            return Err(ConflictError::CourseAlreadyAssigned {
                course_id: course_id.to_string(),
                instructor_id: existing,
            }
            .into());
        }
        ensure_exists(&tx, RecordKind::Instructor, instructor_id)?;

        tx.execute(
            "UPDATE courses SET instructor_id = ?1 WHERE course_id = ?2;",
            params![instructor_id, course_id],
        )?;

        tx.commit()?;
        Ok(())
    }

    fn list_records(&self, kind: RecordKind) -> RepoResult<Vec<RecordRow>> {
        query_rows(self.conn, kind, None)
    }

    fn find_records(
        &self,
        kind: RecordKind,
        field: SearchField,
        term: &str,
    ) -> RepoResult<Vec<RecordRow>> {
        query_rows(self.conn, kind, Some((field, term)))
    }

    fn apply_edit(
        &mut self,
        kind: RecordKind,
        id: &str,
        edit: &RecordEdit,
    ) -> RepoResult<EditOutcome> {
        if !edit.applies_to(kind) {
            return Err(ValidationError::EditKindMismatch(kind).into());
        }

        let spec = table_spec(kind);
        let mut outcome = EditOutcome::new(kind, id);
        let tx = self.begin()?;
        ensure_exists(&tx, kind, id)?;

        match edit {
            RecordEdit::Person(person_edit) => {
                let resolved = person_edit.resolve();
                if let Some(name) = resolved.name.as_deref() {
                    update_column(&tx, spec, spec.name_column, &name, id)?;
                    outcome.applied.push(EditedField::Name);
                }
                if let Some(age) = resolved.age {
                    update_column(&tx, spec, "age", &age, id)?;
                    outcome.applied.push(EditedField::Age);
                }
                if let Some(email) = resolved.email.as_deref() {
                    update_column(&tx, spec, "email", &email, id)?;
                    outcome.applied.push(EditedField::Email);
                }
                outcome.warnings = resolved.warnings;
            }
            RecordEdit::Course(course_edit) => {
                let resolved = course_edit.resolve();
                if let Some(name) = resolved.name.as_deref() {
                    update_column(&tx, spec, spec.name_column, &name, id)?;
                    outcome.applied.push(EditedField::Name);
                }
                if let Some(instructor_id) = resolved.instructor_id.as_deref() {
                    update_column(&tx, spec, "instructor_id", &instructor_id, id)?;
                    outcome.applied.push(EditedField::InstructorId);
                }
            }
        }

        tx.commit()?;
        Ok(outcome)
    }

    fn delete_record(&mut self, kind: RecordKind, id: &str) -> RepoResult<()> {
        let spec = table_spec(kind);
        let tx = self.begin()?;
        let changed = tx.execute(
            &format!("DELETE FROM {} WHERE {} = ?1;", spec.table, spec.id_column),
            [id],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound {
                kind,
                id: id.to_string(),
            });
        }

        tx.commit()?;
        Ok(())
    }
}

fn update_column(
    tx: &Transaction<'_>,
    spec: &TableSpec,
    column: &str,
    value: &dyn ToSql,
    id: &str,
) -> RepoResult<()> {
    tx.execute(
        &format!(
            "UPDATE {} SET {column} = ?1 WHERE {} = ?2;",
            spec.table, spec.id_column
        ),
        params![value, id],
    )?;
    Ok(())
}

fn map_insert_error(err: rusqlite::Error, kind: RecordKind, id: &str) -> RepoError {
    if is_key_collision(&err) {
        RepoError::DuplicateKey {
            kind,
            id: id.to_string(),
        }
    } else {
        err.into()
    }
}

/// Only primary-key violations name the inserted id. Other unique indexes
/// (for example on an adopted legacy schema) stay storage errors.
fn is_key_collision(err: &rusqlite::Error) -> bool {
    match err {
        rusqlite::Error::SqliteFailure(failure, _) => {
            failure.code == ErrorCode::ConstraintViolation
                && failure.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY
        }
        _ => false,
    }
}

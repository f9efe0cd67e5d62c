//! Record use-case service.
//!
//! # Responsibility
//! - Provide the entry points a form-driven UI calls for every action.
//! - Validate raw form values before any storage access.
//! - Delegate persistence to a `RecordRepository`.
//!
//! # Invariants
//! - Validation failures never reach the repository.
//! - Log lines carry record kinds and error codes only, never names or
//!   emails.

use crate::model::edit::{EditOutcome, RecordEdit};
use crate::model::record::{PersonKind, RecordKind, RecordRow, SearchField};
use crate::model::validation::{
    id_field, parse_new_course, parse_new_person, require_field, InputField,
};
use crate::repo::record_repo::{ErrorKind, RecordRepository, RepoError, RepoResult};
use log::{debug, error, info, warn};
use std::time::Instant;

/// Use-case service wrapper for record operations.
pub struct RecordService<R: RecordRepository> {
    repo: R,
}

impl<R: RecordRepository> RecordService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Adds a student from raw form values.
    ///
    /// # Errors
    /// - `Validation` for an empty field, a non-numeric or non-positive
    ///   age, or an email without `@` and `.`.
    /// - `DuplicateKey` when the id is already taken.
    pub fn add_student(&mut self, id: &str, name: &str, age: &str, email: &str) -> RepoResult<()> {
        self.add_person(PersonKind::Student, id, name, age, email)
    }

    /// Adds an instructor from raw form values. Same contract as
    /// [`Self::add_student`].
    pub fn add_instructor(
        &mut self,
        id: &str,
        name: &str,
        age: &str,
        email: &str,
    ) -> RepoResult<()> {
        self.add_person(PersonKind::Instructor, id, name, age, email)
    }

    /// Adds a course with no instructor.
    pub fn add_course(&mut self, id: &str, name: &str) -> RepoResult<()> {
        let started_at = Instant::now();
        let result = parse_new_course(id, name)
            .map_err(RepoError::from)
            .and_then(|course| self.repo.insert_course(&course));
        log_outcome("record_add", RecordKind::Course.as_str(), started_at, &result);
        result
    }

    /// Lists all course ids, e.g. to fill a selection input.
    pub fn list_course_ids(&self) -> RepoResult<Vec<String>> {
        let started_at = Instant::now();
        let result = self.repo.list_course_ids();
        log_outcome("course_ids_list", RecordKind::Course.as_str(), started_at, &result);
        result
    }

    /// Enrolls a student in a course.
    ///
    /// # Errors
    /// - `Validation` when either id is blank.
    /// - `NotFound` when the student or the course does not exist.
    pub fn register_student_for_course(
        &mut self,
        student_id: &str,
        course_id: &str,
    ) -> RepoResult<()> {
        let started_at = Instant::now();
        let result = require_field(InputField::StudentId, student_id)
            .and_then(|student_id| {
                require_field(InputField::CourseId, course_id)
                    .map(|course_id| (student_id, course_id))
            })
            .map_err(RepoError::from)
            .and_then(|(student_id, course_id)| self.repo.enroll_student(&student_id, &course_id));
        log_outcome("course_register", "enrollment", started_at, &result);
        result
    }

    /// Assigns an instructor to a course that has none.
    ///
    /// # Errors
    /// - `Validation` when either id is blank.
    /// - `NotFound` when the instructor or the course does not exist.
    /// - `Conflict` when the course already has an instructor.
    pub fn assign_instructor_to_course(
        &mut self,
        instructor_id: &str,
        course_id: &str,
    ) -> RepoResult<()> {
        let started_at = Instant::now();
        let result = require_field(InputField::InstructorId, instructor_id)
            .and_then(|instructor_id| {
                require_field(InputField::CourseId, course_id)
                    .map(|course_id| (instructor_id, course_id))
            })
            .map_err(RepoError::from)
            .and_then(|(instructor_id, course_id)| {
                self.repo.assign_instructor(&instructor_id, &course_id)
            });
        log_outcome("course_assign", "assignment", started_at, &result);
        result
    }

    /// Lists every row of one kind with its relation annotations.
    pub fn list_all(&self, kind: RecordKind) -> RepoResult<Vec<RecordRow>> {
        let started_at = Instant::now();
        let result = self.repo.list_records(kind);
        log_outcome("record_list", kind.as_str(), started_at, &result);
        result
    }

    /// Finds rows whose id or name equals `term` exactly.
    ///
    /// A blank `term` is rejected with `Validation`.
    pub fn search(
        &self,
        kind: RecordKind,
        field: SearchField,
        term: &str,
    ) -> RepoResult<Vec<RecordRow>> {
        let started_at = Instant::now();
        let result = require_field(InputField::SearchTerm, term)
            .map_err(RepoError::from)
            .and_then(|term| self.repo.find_records(kind, field, &term));
        log_outcome("record_search", kind.as_str(), started_at, &result);
        result
    }

    /// Applies the fields supplied in `edit` to one record.
    ///
    /// Malformed age values are skipped and reported in
    /// [`EditOutcome::warnings`]; the remaining fields are still written.
    ///
    /// # Errors
    /// - `Validation` when `id` is blank or `edit` targets another kind.
    /// - `NotFound` when the record does not exist.
    pub fn edit_record(
        &mut self,
        kind: RecordKind,
        id: &str,
        edit: &RecordEdit,
    ) -> RepoResult<EditOutcome> {
        let started_at = Instant::now();
        let result = require_field(id_field(kind), id)
            .map_err(RepoError::from)
            .and_then(|id| self.repo.apply_edit(kind, &id, edit));

        if let Ok(outcome) = &result {
            for warning in &outcome.warnings {
                warn!(
                    "event=record_edit_warning module=service kind={} field={}",
                    kind,
                    warning.field.label().replace(' ', "_")
                );
            }
        }
        log_outcome("record_edit", kind.as_str(), started_at, &result);
        result
    }

    /// Deletes one record. Rows referencing it are left in place.
    pub fn delete_record(&mut self, kind: RecordKind, id: &str) -> RepoResult<()> {
        let started_at = Instant::now();
        let result = require_field(id_field(kind), id)
            .map_err(RepoError::from)
            .and_then(|id| self.repo.delete_record(kind, &id));
        log_outcome("record_delete", kind.as_str(), started_at, &result);
        result
    }

    fn add_person(
        &mut self,
        kind: PersonKind,
        id: &str,
        name: &str,
        age: &str,
        email: &str,
    ) -> RepoResult<()> {
        let started_at = Instant::now();
        let record_kind = RecordKind::from(kind);
        debug!(
            "event=record_add module=service status=start kind={}",
            record_kind
        );
        let result = parse_new_person(kind, id, name, age, email)
            .map_err(RepoError::from)
            .and_then(|person| self.repo.insert_person(kind, &person));
        log_outcome("record_add", record_kind.as_str(), started_at, &result);
        result
    }
}

fn log_outcome<T>(event: &str, subject: &str, started_at: Instant, result: &RepoResult<T>) {
    let duration_ms = started_at.elapsed().as_millis();
    match result {
        Ok(_) => info!(
            "event={} module=service status=ok kind={} duration_ms={}",
            event, subject, duration_ms
        ),
        Err(err) if err.kind() == ErrorKind::Storage => error!(
            "event={} module=service status=error kind={} duration_ms={} error_kind={} error_code={} error={}",
            event,
            subject,
            duration_ms,
            err.kind(),
            err.code(),
            err
        ),
        Err(err) => warn!(
            "event={} module=service status=error kind={} duration_ms={} error_kind={} error_code={}",
            event,
            subject,
            duration_ms,
            err.kind(),
            err.code()
        ),
    }
}

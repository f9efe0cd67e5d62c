//! Domain model for school records.
//!
//! # Responsibility
//! - Define the student/instructor/course read models and write inputs.
//! - Parse and validate raw caller input before it reaches storage.
//! - Describe partial edits without sentinel values.
//!
//! # Invariants
//! - Every record is identified by a caller-supplied, non-empty id.
//! - Write inputs (`NewPerson`, `NewCourse`) only exist in validated form
//!   when produced by the `validation` parsers.

pub mod edit;
pub mod record;
pub mod validation;

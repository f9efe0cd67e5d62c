//! Core record store for the school management application.
//! This crate is the single source of truth for record integrity rules.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod store;

pub use db::DEFAULT_DB_PATH;
pub use logging::{default_log_level, init_logging, logging_status, LogLevel, LoggingError};
pub use model::edit::{
    field_from_prompt, CourseEdit, EditOutcome, EditWarning, EditedField, PersonEdit, RecordEdit,
    KEEP_CURRENT_MARKER,
};
pub use model::record::{
    CourseRecord, InstructorRecord, NewCourse, NewPerson, PersonKind, RecordKind, RecordRow,
    SearchField, StudentRecord,
};
pub use model::validation::{InputField, ValidationError};
pub use repo::record_repo::{
    ConflictError, ErrorKind, RecordRepository, RepoError, RepoResult, SqliteRecordRepository,
};
pub use service::record_service::RecordService;
pub use store::{RecordStore, StoreConfig};

/// Minimal health-check API for front-end wiring checks.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}

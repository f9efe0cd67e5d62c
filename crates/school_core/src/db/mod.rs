//! Database file handling for the school record store.
//!
//! Two ways in: `open_db` creates whatever tables are missing and stamps
//! `PRAGMA user_version`; `open_db_existing` adopts a database kept by the
//! legacy desktop application exactly as found, so a mistyped path fails
//! instead of producing an empty file.
//!
//! Foreign key enforcement is switched off on every connection. Deleting a
//! student, instructor or course leaves the enrollment and assignment rows
//! that point at it.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod migrations;
mod open;

pub use open::{open_db, open_db_existing, open_db_in_memory};

/// Location the desktop application has always used for its database file.
pub const DEFAULT_DB_PATH: &str = "../Database/database.sqlite";

pub type DbResult<T> = Result<T, DbError>;

/// Failure while opening a database file or bringing its tables up to date.
#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    /// The file was written by a newer build of the store.
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "school database is at schema version {db_version}; this build understands up to {latest_supported}"
            ),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::UnsupportedSchemaVersion { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

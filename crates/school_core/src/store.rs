//! Process-lifetime record store.
//!
//! # Responsibility
//! - Own the single SQLite connection used by the application.
//! - Hand out services that borrow it for the duration of a call.
//!
//! # Invariants
//! - A `RecordStore` only exists on a connection that passed the schema
//!   readiness check.
//! - The connection is closed when the store is closed or dropped.

use crate::db::{open_db, open_db_existing, open_db_in_memory, DbError, DbResult, DEFAULT_DB_PATH};
use crate::repo::record_repo::{RepoResult, SqliteRecordRepository};
use crate::repo::schema_check::ensure_connection_ready;
use crate::service::record_service::RecordService;
use log::{error, info};
use rusqlite::Connection;
use std::path::PathBuf;

/// Startup settings for a [`RecordStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub db_path: PathBuf,
    /// Create missing tables on open. When `false` the schema must already
    /// exist.
    pub create_schema: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DEFAULT_DB_PATH),
            create_schema: true,
        }
    }
}

impl StoreConfig {
    pub fn with_db_path(path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: path.into(),
            ..Self::default()
        }
    }
}

pub struct RecordStore {
    conn: Connection,
}

impl RecordStore {
    /// Opens the database described by `config`.
    ///
    /// # Errors
    /// - `Db` when the file cannot be opened or migrated.
    /// - `MissingRequiredTable` / `MissingRequiredColumn` when the schema
    ///   is incomplete.
    pub fn open(config: &StoreConfig) -> RepoResult<Self> {
        let conn = if config.create_schema {
            open_db(&config.db_path)?
        } else {
            open_db_existing(&config.db_path)?
        };
        Self::from_connection(conn)
    }

    /// Opens a fresh in-memory store with the full schema.
    pub fn open_in_memory() -> RepoResult<Self> {
        Self::from_connection(open_db_in_memory()?)
    }

    /// Wraps an already configured connection.
    pub fn from_connection(conn: Connection) -> RepoResult<Self> {
        ensure_connection_ready(&conn)?;
        Ok(Self { conn })
    }

    /// Returns a service borrowing this store's connection.
    pub fn service(&mut self) -> RecordService<SqliteRecordRepository<'_>> {
        RecordService::new(SqliteRecordRepository::from_ready(&mut self.conn))
    }

    /// Read access to the underlying connection, for diagnostics.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Closes the connection, reporting any error SQLite raises on close.
    pub fn close(self) -> DbResult<()> {
        match self.conn.close() {
            Ok(()) => {
                info!("event=db_close module=db status=ok");
                Ok(())
            }
            Err((_, err)) => {
                error!(
                    "event=db_close module=db status=error error_code=db_close_failed error={}",
                    err
                );
                Err(DbError::Sqlite(err))
            }
        }
    }
}

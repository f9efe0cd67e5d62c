//! Connection bootstrap utilities for SQLite.
//!
//! # Responsibility
//! - Open file or in-memory SQLite connections.
//! - Configure connection pragmas the record store relies on.
//! - Optionally run schema migrations before handing the connection out.
//!
//! # Invariants
//! - Returned connections have `foreign_keys=OFF`.
//! - `open_db` and `open_db_in_memory` return fully migrated connections.

use super::migrations::apply_migrations;
use super::DbResult;
use log::{error, info};
use rusqlite::{Connection, OpenFlags};
use std::path::Path;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Bootstrap {
    Migrate,
    Adopt,
}

/// Opens a SQLite database file and applies all pending migrations.
///
/// Databases created by the legacy desktop application are adopted as-is:
/// the initial migration only creates tables that are missing.
///
/// # Side effects
/// - Emits `db_open` logging events with duration and status.
pub fn open_db(path: impl AsRef<Path>) -> DbResult<Connection> {
    open_file(path.as_ref(), Bootstrap::Migrate)
}

/// Opens an existing SQLite database file without touching its schema.
///
/// Fails when the file does not exist. Callers are expected to run the
/// repository readiness check afterwards.
pub fn open_db_existing(path: impl AsRef<Path>) -> DbResult<Connection> {
    open_file(path.as_ref(), Bootstrap::Adopt)
}

/// Opens an in-memory SQLite database and applies all pending migrations.
///
/// # Side effects
/// - Emits `db_open` logging events with duration and status.
pub fn open_db_in_memory() -> DbResult<Connection> {
    let started_at = Instant::now();
    info!("event=db_open module=db status=start mode=memory");

    let mut conn = match Connection::open_in_memory() {
        Ok(conn) => conn,
        Err(err) => {
            error!(
                "event=db_open module=db status=error mode=memory duration_ms={} error_code=db_open_failed error={}",
                started_at.elapsed().as_millis(),
                err
            );
            return Err(err.into());
        }
    };

    finish_open(&mut conn, "memory", Bootstrap::Migrate, started_at)?;
    Ok(conn)
}

fn open_file(path: &Path, bootstrap: Bootstrap) -> DbResult<Connection> {
    let started_at = Instant::now();
    info!("event=db_open module=db status=start mode=file");

    let opened = match bootstrap {
        Bootstrap::Migrate => Connection::open(path),
        // An adopted database must already exist; never create an empty file.
        Bootstrap::Adopt => Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_WRITE
                | OpenFlags::SQLITE_OPEN_URI
                | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        ),
    };
    let mut conn = match opened {
        Ok(conn) => conn,
        Err(err) => {
            error!(
                "event=db_open module=db status=error mode=file duration_ms={} error_code=db_open_failed error={}",
                started_at.elapsed().as_millis(),
                err
            );
            return Err(err.into());
        }
    };

    finish_open(&mut conn, "file", bootstrap, started_at)?;
    Ok(conn)
}

fn finish_open(
    conn: &mut Connection,
    mode: &str,
    bootstrap: Bootstrap,
    started_at: Instant,
) -> DbResult<()> {
    match bootstrap_connection(conn, bootstrap) {
        Ok(()) => {
            info!(
                "event=db_open module=db status=ok mode={} migrate={} duration_ms={}",
                mode,
                bootstrap == Bootstrap::Migrate,
                started_at.elapsed().as_millis()
            );
            Ok(())
        }
        Err(err) => {
            error!(
                "event=db_open module=db status=error mode={} duration_ms={} error_code=db_bootstrap_failed error={}",
                mode,
                started_at.elapsed().as_millis(),
                err
            );
            Err(err)
        }
    }
}

fn bootstrap_connection(conn: &mut Connection, bootstrap: Bootstrap) -> DbResult<()> {
    // Deletes must not cascade or be refused because of dependent rows.
    conn.execute_batch("PRAGMA foreign_keys = OFF;")?;
    conn.busy_timeout(Duration::from_secs(5))?;
    if bootstrap == Bootstrap::Migrate {
        apply_migrations(conn)?;
    }
    Ok(())
}

//! Readiness checks for connections handed to the record repository.
//!
//! The store may sit on a database whose schema was created elsewhere, so
//! the required tables and columns are verified before any request runs.

use crate::repo::record_repo::{RepoError, RepoResult};
use rusqlite::Connection;

const REQUIRED_SCHEMA: &[(&str, &[&str])] = &[
    ("students", &["student_id", "name", "age", "email"]),
    ("instructors", &["instructor_id", "name", "age", "email"]),
    ("courses", &["course_id", "course_name", "instructor_id"]),
    ("student_courses", &["student_id", "course_id"]),
];

/// Fails with `MissingRequiredTable` or `MissingRequiredColumn` for the
/// first gap found, in table order.
pub fn ensure_connection_ready(conn: &Connection) -> RepoResult<()> {
    for &(table, columns) in REQUIRED_SCHEMA {
        if !table_exists(conn, table)? {
            return Err(RepoError::MissingRequiredTable(table));
        }

        let present = table_columns(conn, table)?;
        for &column in columns {
            if !present.iter().any(|name| name == column) {
                return Err(RepoError::MissingRequiredColumn { table, column });
            }
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_columns(conn: &Connection, table: &str) -> RepoResult<Vec<String>> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    let mut columns = Vec::new();
    while let Some(row) = rows.next()? {
        columns.push(row.get::<_, String>(1)?);
    }
    Ok(columns)
}

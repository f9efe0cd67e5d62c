use school_core::db::migrations::{current_user_version, latest_version};
use school_core::db::{open_db, open_db_existing, open_db_in_memory, DbError};
use school_core::{ErrorKind, RecordKind, RecordStore, RepoError, StoreConfig};
use rusqlite::Connection;

#[test]
fn open_db_in_memory_creates_all_tables() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(current_user_version(&conn).unwrap(), latest_version());
    for table in ["students", "instructors", "courses", "student_courses"] {
        assert_table_exists(&conn, table);
    }
}

#[test]
fn foreign_key_enforcement_is_off() {
    let conn = open_db_in_memory().unwrap();
    let enabled: i64 = conn
        .query_row("PRAGMA foreign_keys;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(enabled, 0);
}

#[test]
fn opening_same_database_twice_keeps_rows() {
    let dir = tempfile::tempdir().unwrap();
    let config = StoreConfig::with_db_path(dir.path().join("school.sqlite"));

    let mut store = RecordStore::open(&config).unwrap();
    store
        .service()
        .add_student("S1", "Ada", "20", "ada@uni.edu")
        .unwrap();
    store.close().unwrap();

    let mut reopened = RecordStore::open(&config).unwrap();
    let rows = reopened.service().list_all(RecordKind::Student).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].id(), "S1");
    assert_eq!(
        current_user_version(reopened.connection()).unwrap(),
        latest_version()
    );
}

#[test]
fn legacy_database_is_adopted_without_data_loss() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("legacy.sqlite");
    {
        let conn = Connection::open(&path).unwrap();
        conn.execute_batch(
            "CREATE TABLE students (student_id TEXT PRIMARY KEY, name TEXT, age INTEGER, email TEXT);
             CREATE TABLE instructors (instructor_id TEXT PRIMARY KEY, name TEXT, age INTEGER, email TEXT);
             CREATE TABLE courses (course_id TEXT PRIMARY KEY, course_name TEXT, instructor_id TEXT);
             CREATE TABLE student_courses (student_id TEXT, course_id TEXT);
             INSERT INTO courses (course_id, course_name, instructor_id) VALUES ('C1', 'Algebra', '');",
        )
        .unwrap();
    }

    let existing_only = StoreConfig {
        db_path: path.clone(),
        create_schema: false,
    };
    let mut store = RecordStore::open(&existing_only).unwrap();
    let rows = store.service().list_all(RecordKind::Course).unwrap();
    let course = rows[0].as_course().unwrap();
    assert_eq!(course.course_id, "C1");
    assert_eq!(course.instructor_id.as_deref(), Some(""));
    assert_eq!(current_user_version(store.connection()).unwrap(), 0);
    store.close().unwrap();

    let mut migrated = RecordStore::open(&StoreConfig::with_db_path(&path)).unwrap();
    assert_eq!(
        current_user_version(migrated.connection()).unwrap(),
        latest_version()
    );
    assert_eq!(migrated.service().list_course_ids().unwrap(), vec!["C1"]);
}

#[test]
fn existing_only_open_does_not_create_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("typo.sqlite");

    let err = open_db_existing(&path).unwrap_err();
    assert!(matches!(err, DbError::Sqlite(_)));

    let existing_only = StoreConfig {
        db_path: path.clone(),
        create_schema: false,
    };
    let store_err = RecordStore::open(&existing_only).err().unwrap();
    assert_eq!(store_err.kind(), ErrorKind::Storage);
    assert!(!path.exists());
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.sqlite");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    match open_db(&path).unwrap_err() {
        DbError::UnsupportedSchemaVersion {
            db_version,
            latest_supported,
        } => {
            assert_eq!(db_version, 999);
            assert_eq!(latest_supported, latest_version());
        }
        other => panic!("unexpected error: {other}"),
    }

    let store_err = RecordStore::open(&StoreConfig::with_db_path(&path))
        .err()
        .unwrap();
    assert!(matches!(
        store_err,
        RepoError::Db(DbError::UnsupportedSchemaVersion { .. })
    ));
}

#[test]
fn store_rejects_connection_without_required_tables() {
    let conn = Connection::open_in_memory().unwrap();

    let result = RecordStore::from_connection(conn);
    assert!(matches!(
        result,
        Err(RepoError::MissingRequiredTable("students"))
    ));
}

#[test]
fn store_rejects_connection_missing_required_column() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(
        "CREATE TABLE students (
            student_id TEXT PRIMARY KEY NOT NULL,
            name TEXT NOT NULL,
            age INTEGER NOT NULL
        );",
    )
    .unwrap();

    let result = RecordStore::from_connection(conn);
    assert!(matches!(
        result,
        Err(RepoError::MissingRequiredColumn {
            table: "students",
            column: "email"
        })
    ));
}

fn assert_table_exists(conn: &Connection, table_name: &str) {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = ?1
            );",
            [table_name],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(exists, 1, "table {table_name} does not exist");
}

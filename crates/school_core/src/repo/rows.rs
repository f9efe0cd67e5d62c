//! Table layout and read-model loading shared by repository operations.

use crate::model::record::{
    CourseRecord, InstructorRecord, RecordKind, RecordRow, SearchField, StudentRecord,
};
use crate::repo::record_repo::{RepoError, RepoResult};
use rusqlite::types::{FromSql, Value};
use rusqlite::{params_from_iter, Connection, Row};

pub(crate) struct TableSpec {
    pub table: &'static str,
    pub id_column: &'static str,
    pub name_column: &'static str,
    select_sql: &'static str,
}

const STUDENTS: TableSpec = TableSpec {
    table: "students",
    id_column: "student_id",
    name_column: "name",
    select_sql: "SELECT student_id, name, age, email FROM students",
};

const INSTRUCTORS: TableSpec = TableSpec {
    table: "instructors",
    id_column: "instructor_id",
    name_column: "name",
    select_sql: "SELECT instructor_id, name, age, email FROM instructors",
};

const COURSES: TableSpec = TableSpec {
    table: "courses",
    id_column: "course_id",
    name_column: "course_name",
    select_sql: "SELECT course_id, course_name, instructor_id FROM courses",
};

const ENROLLED_COURSES_SQL: &str = "SELECT course_id
    FROM student_courses
    WHERE student_id = ?1
    ORDER BY rowid ASC;";

const TAUGHT_COURSES_SQL: &str = "SELECT course_id
    FROM courses
    WHERE instructor_id = ?1
    ORDER BY rowid ASC;";

const ENROLLED_STUDENTS_SQL: &str = "SELECT student_id
    FROM student_courses
    WHERE course_id = ?1
    ORDER BY rowid ASC;";

pub(crate) fn table_spec(kind: RecordKind) -> &'static TableSpec {
    match kind {
        RecordKind::Student => &STUDENTS,
        RecordKind::Instructor => &INSTRUCTORS,
        RecordKind::Course => &COURSES,
    }
}

/// Loads rows of one kind in insertion order, optionally filtered by an
/// exact match on the id or name column.
pub(crate) fn query_rows(
    conn: &Connection,
    kind: RecordKind,
    filter: Option<(SearchField, &str)>,
) -> RepoResult<Vec<RecordRow>> {
    let spec = table_spec(kind);
    let mut sql = String::from(spec.select_sql);
    let mut bind_values: Vec<Value> = Vec::new();

    if let Some((field, term)) = filter {
        let column = match field {
            SearchField::Id => spec.id_column,
            SearchField::Name => spec.name_column,
        };
        sql.push_str(&format!(" WHERE {column} = ?"));
        bind_values.push(Value::Text(term.to_string()));
    }

    sql.push_str(" ORDER BY rowid ASC;");

    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query(params_from_iter(bind_values))?;
    let mut records = Vec::new();
    while let Some(row) = rows.next()? {
        records.push(parse_record_row(conn, kind, row)?);
    }

    Ok(records)
}

pub(crate) fn record_exists(conn: &Connection, kind: RecordKind, id: &str) -> RepoResult<bool> {
    let spec = table_spec(kind);
    let exists: i64 = conn.query_row(
        &format!(
            "SELECT EXISTS(SELECT 1 FROM {} WHERE {} = ?1);",
            spec.table, spec.id_column
        ),
        [id],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

pub(crate) fn ensure_exists(conn: &Connection, kind: RecordKind, id: &str) -> RepoResult<()> {
    if record_exists(conn, kind, id)? {
        Ok(())
    } else {
        Err(RepoError::NotFound {
            kind,
            id: id.to_string(),
        })
    }
}

fn parse_record_row(conn: &Connection, kind: RecordKind, row: &Row<'_>) -> RepoResult<RecordRow> {
    match kind {
        RecordKind::Student => {
            let student_id: String = column(row, "student_id")?;
            let course_ids = load_related_ids(conn, ENROLLED_COURSES_SQL, &student_id)?;
            Ok(RecordRow::Student(StudentRecord {
                name: column(row, "name")?,
                age: column(row, "age")?,
                email: column(row, "email")?,
                student_id,
                course_ids,
            }))
        }
        RecordKind::Instructor => {
            let instructor_id: String = column(row, "instructor_id")?;
            let course_ids = load_related_ids(conn, TAUGHT_COURSES_SQL, &instructor_id)?;
            Ok(RecordRow::Instructor(InstructorRecord {
                name: column(row, "name")?,
                age: column(row, "age")?,
                email: column(row, "email")?,
                instructor_id,
                course_ids,
            }))
        }
        RecordKind::Course => {
            let course_id: String = column(row, "course_id")?;
            let student_ids = load_related_ids(conn, ENROLLED_STUDENTS_SQL, &course_id)?;
            Ok(RecordRow::Course(CourseRecord {
                name: column(row, "course_name")?,
                instructor_id: column(row, "instructor_id")?,
                course_id,
                student_ids,
            }))
        }
    }
}

/// Reads one column, reporting stored values of the wrong type (a NULL
/// name, a text age) as invalid record data.
fn column<T: FromSql>(row: &Row<'_>, name: &str) -> RepoResult<T> {
    row.get(name).map_err(|err| match err {
        rusqlite::Error::InvalidColumnType(_, column, stored) => {
            RepoError::InvalidData(format!("column `{column}` holds {stored}"))
        }
        rusqlite::Error::FromSqlConversionFailure(_, stored, source) => {
            RepoError::InvalidData(format!("column `{name}` holds {stored}: {source}"))
        }
        other => other.into(),
    })
}

fn load_related_ids(conn: &Connection, sql: &str, id: &str) -> RepoResult<Vec<String>> {
    let mut stmt = conn.prepare_cached(sql)?;
    let mut rows = stmt.query([id])?;
    let mut ids = Vec::new();
    while let Some(row) = rows.next()? {
        ids.push(row.get(0)?);
    }
    Ok(ids)
}

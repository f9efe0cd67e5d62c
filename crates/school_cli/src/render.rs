//! Plain-text and JSON output for command results.

use school_core::{EditOutcome, RecordRow};
use serde_json::json;

pub fn done(message: &str, json: bool) {
    if json {
        print_json(&json!({ "ok": true, "message": message }));
    } else {
        println!("{message}");
    }
}

pub fn ids(ids: &[String], json: bool) {
    if json {
        print_json(&json!(ids));
    } else {
        for id in ids {
            println!("{id}");
        }
    }
}

pub fn rows(rows: &[RecordRow], json: bool) {
    if json {
        print_json(&json!(rows));
        return;
    }

    if rows.is_empty() {
        println!("no records");
        return;
    }
    for row in rows {
        println!("{}", row_line(row));
    }
}

pub fn edit(outcome: &EditOutcome, json: bool) {
    let warnings: Vec<String> = outcome.warnings.iter().map(ToString::to_string).collect();
    if json {
        print_json(&json!({
            "ok": true,
            "kind": outcome.kind,
            "id": outcome.id,
            "applied": outcome.applied,
            "warnings": warnings,
        }));
        return;
    }

    for warning in &warnings {
        eprintln!("warning: {warning}");
    }
    if outcome.is_noop() {
        println!("{} {} unchanged", outcome.kind, outcome.id);
    } else {
        println!("{} {} updated", outcome.kind, outcome.id);
    }
}

fn row_line(row: &RecordRow) -> String {
    match row {
        RecordRow::Student(student) => format!(
            "{}\t{}\t{}\t{}\tcourses=[{}]",
            student.student_id,
            student.name,
            student.age,
            student.email,
            student.course_ids.join(", ")
        ),
        RecordRow::Instructor(instructor) => format!(
            "{}\t{}\t{}\t{}\tcourses=[{}]",
            instructor.instructor_id,
            instructor.name,
            instructor.age,
            instructor.email,
            instructor.course_ids.join(", ")
        ),
        RecordRow::Course(course) => format!(
            "{}\t{}\tinstructor={}\tstudents=[{}]",
            course.course_id,
            course.name,
            course.instructor_id.as_deref().unwrap_or("-"),
            course.student_ids.join(", ")
        ),
    }
}

fn print_json(value: &serde_json::Value) {
    match serde_json::to_string_pretty(value) {
        Ok(text) => println!("{text}"),
        Err(err) => eprintln!("error: failed to encode output: {err}"),
    }
}

#[cfg(test)]
mod tests {
    use super::row_line;
    use school_core::{CourseRecord, RecordRow};

    #[test]
    fn course_line_marks_missing_instructor() {
        let row = RecordRow::Course(CourseRecord {
            course_id: "C1".to_string(),
            name: "Algebra".to_string(),
            instructor_id: None,
            student_ids: vec!["S1".to_string(), "S2".to_string()],
        });
        assert_eq!(row_line(&row), "C1\tAlgebra\tinstructor=-\tstudents=[S1, S2]");
    }
}

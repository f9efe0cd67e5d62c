use school_core::{
    CourseEdit, EditedField, ErrorKind, InputField, PersonEdit, RecordEdit, RecordKind,
    RecordStore, RepoError, SearchField, StudentRecord, ValidationError,
};

fn store_with_student() -> RecordStore {
    let mut store = RecordStore::open_in_memory().unwrap();
    store
        .service()
        .add_student("S1", "Ada", "20", "ada@uni.edu")
        .unwrap();
    store
}

fn student(store: &mut RecordStore, id: &str) -> StudentRecord {
    let rows = store
        .service()
        .search(RecordKind::Student, SearchField::Id, id)
        .unwrap();
    rows[0].as_student().unwrap().clone()
}

#[test]
fn edit_applies_only_supplied_fields() {
    let mut store = store_with_student();

    let edit = PersonEdit {
        name: Some("Ada L.".to_string()),
        ..PersonEdit::default()
    };
    let outcome = store
        .service()
        .edit_record(RecordKind::Student, "S1", &edit.into())
        .unwrap();
    assert_eq!(outcome.applied, vec![EditedField::Name]);
    assert!(outcome.warnings.is_empty());

    let updated = student(&mut store, "S1");
    assert_eq!(updated.name, "Ada L.");
    assert_eq!(updated.age, 20);
    assert_eq!(updated.email, "ada@uni.edu");
}

#[test]
fn keep_current_marker_leaves_age_unchanged() {
    let mut store = store_with_student();

    let edit = PersonEdit::from_prompts("NA", "NA", "NA");
    let outcome = store
        .service()
        .edit_record(RecordKind::Student, "S1", &edit.into())
        .unwrap();
    assert!(outcome.is_noop());
    assert!(outcome.warnings.is_empty());
    assert_eq!(student(&mut store, "S1").age, 20);
}

#[test]
fn malformed_age_is_skipped_with_warning_and_other_fields_apply() {
    let mut store = store_with_student();

    let edit = PersonEdit::from_prompts("NA", "abc", "ada@college.edu");
    let outcome = store
        .service()
        .edit_record(RecordKind::Student, "S1", &edit.into())
        .unwrap();

    assert_eq!(outcome.applied, vec![EditedField::Email]);
    assert_eq!(outcome.warnings.len(), 1);
    assert_eq!(outcome.warnings[0].field, InputField::Age);

    let updated = student(&mut store, "S1");
    assert_eq!(updated.age, 20);
    assert_eq!(updated.email, "ada@college.edu");
}

#[test]
fn valid_age_edit_is_written() {
    let mut store = store_with_student();

    let edit = PersonEdit {
        age: Some("21".to_string()),
        ..PersonEdit::default()
    };
    store
        .service()
        .edit_record(RecordKind::Student, "S1", &edit.into())
        .unwrap();
    assert_eq!(student(&mut store, "S1").age, 21);
}

#[test]
fn edit_of_missing_record_is_not_found() {
    let mut store = RecordStore::open_in_memory().unwrap();

    let err = store
        .service()
        .edit_record(
            RecordKind::Instructor,
            "I1",
            &PersonEdit::from_prompts("Ann", "NA", "NA").into(),
        )
        .unwrap_err();
    assert!(matches!(
        &err,
        RepoError::NotFound { kind: RecordKind::Instructor, id } if id == "I1"
    ));
}

#[test]
fn edit_must_match_record_kind() {
    let mut store = store_with_student();

    let err = store
        .service()
        .edit_record(
            RecordKind::Student,
            "S1",
            &RecordEdit::Course(CourseEdit::from_prompts("Algebra", "NA")),
        )
        .unwrap_err();
    assert!(matches!(
        err,
        RepoError::Validation(ValidationError::EditKindMismatch(RecordKind::Student))
    ));
}

#[test]
fn course_edit_sets_name_and_instructor() {
    let mut store = RecordStore::open_in_memory().unwrap();
    let mut service = store.service();
    service.add_course("C1", "Algebra").unwrap();

    let outcome = service
        .edit_record(
            RecordKind::Course,
            "C1",
            &CourseEdit::from_prompts("Linear Algebra", "I7").into(),
        )
        .unwrap();
    assert_eq!(
        outcome.applied,
        vec![EditedField::Name, EditedField::InstructorId]
    );

    let rows = service.list_all(RecordKind::Course).unwrap();
    let course = rows[0].as_course().unwrap();
    assert_eq!(course.name, "Linear Algebra");
    assert_eq!(course.instructor_id.as_deref(), Some("I7"));
}

#[test]
fn failed_edit_rolls_back_earlier_field_updates() {
    let mut store = store_with_student();
    store
        .connection()
        .execute_batch(
            "CREATE TRIGGER lock_student_email
             BEFORE UPDATE OF email ON students
             BEGIN
                SELECT RAISE(ABORT, 'email is locked');
             END;",
        )
        .unwrap();

    let edit = PersonEdit::from_prompts("Bob", "33", "bob@uni.edu");
    let err = store
        .service()
        .edit_record(RecordKind::Student, "S1", &edit.into())
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Storage);

    let unchanged = student(&mut store, "S1");
    assert_eq!(unchanged.name, "Ada");
    assert_eq!(unchanged.age, 20);
    assert_eq!(unchanged.email, "ada@uni.edu");
}

#[test]
fn delete_removes_row_and_reports_missing_ids() {
    let mut store = store_with_student();
    let mut service = store.service();

    service.delete_record(RecordKind::Student, "S1").unwrap();
    assert!(service.list_all(RecordKind::Student).unwrap().is_empty());

    let err = service.delete_record(RecordKind::Student, "S1").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[test]
fn deleting_course_keeps_enrollment_rows() {
    let mut store = store_with_student();
    {
        let mut service = store.service();
        service.add_course("C1", "Algebra").unwrap();
        service.register_student_for_course("S1", "C1").unwrap();
        service.delete_record(RecordKind::Course, "C1").unwrap();
        assert!(service.list_course_ids().unwrap().is_empty());
    }

    let dangling: i64 = store
        .connection()
        .query_row(
            "SELECT COUNT(*) FROM student_courses WHERE course_id = 'C1';",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(dangling, 1);
    assert_eq!(student(&mut store, "S1").course_ids, vec!["C1"]);
}

#[test]
fn deleting_instructor_keeps_course_assignment() {
    let mut store = RecordStore::open_in_memory().unwrap();
    let mut service = store.service();
    service.add_course("C1", "Algebra").unwrap();
    service.add_instructor("I1", "Ann", "30", "a@b.com").unwrap();
    service.assign_instructor_to_course("I1", "C1").unwrap();

    service.delete_record(RecordKind::Instructor, "I1").unwrap();

    let rows = service.list_all(RecordKind::Course).unwrap();
    assert_eq!(rows[0].as_course().unwrap().instructor_id.as_deref(), Some("I1"));
}

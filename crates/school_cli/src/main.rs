//! Command-line front end for the school record store.
//!
//! # Responsibility
//! - Map one subcommand to one store operation.
//! - Print results as plain text or JSON and exit non-zero on failure.

mod render;

use clap::{Args, Parser, Subcommand};
use school_core::{
    default_log_level, init_logging, CourseEdit, ErrorKind, PersonEdit, RecordKind, RecordStore,
    RepoError, SearchField, StoreConfig, DEFAULT_DB_PATH,
};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "school")]
#[command(about = "Manage student, instructor and course records", long_about = None)]
#[command(version)]
struct Cli {
    /// SQLite database file.
    #[arg(long, default_value = DEFAULT_DB_PATH, global = true)]
    db: PathBuf,

    /// Refuse to create missing tables; the schema must already exist.
    #[arg(long, global = true)]
    no_create_schema: bool,

    /// Directory for rolling log files. Logging is off when omitted.
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Print results as JSON.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Check that the core library is linked.
    Ping,
    AddStudent(PersonArgs),
    AddInstructor(PersonArgs),
    AddCourse {
        id: String,
        name: String,
    },
    /// List course ids in insertion order.
    CourseIds,
    /// Enroll a student in a course.
    Register {
        student_id: String,
        course_id: String,
    },
    /// Assign an instructor to a course without one.
    Assign {
        instructor_id: String,
        course_id: String,
    },
    List {
        kind: RecordKind,
    },
    /// Exact-match search by name or id.
    Search {
        kind: RecordKind,
        field: SearchField,
        term: String,
    },
    EditStudent(PersonEditArgs),
    EditInstructor(PersonEditArgs),
    EditCourse(CourseEditArgs),
    Delete {
        kind: RecordKind,
        id: String,
    },
}

#[derive(Args)]
struct PersonArgs {
    id: String,
    name: String,
    /// Passed through as text; the store rejects non-positive values.
    #[arg(allow_negative_numbers = true)]
    age: String,
    email: String,
}

/// Omitted flags, blank values and `NA` keep the current value.
#[derive(Args)]
struct PersonEditArgs {
    id: String,
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    age: Option<String>,
    #[arg(long)]
    email: Option<String>,
}

impl PersonEditArgs {
    fn to_edit(&self) -> PersonEdit {
        PersonEdit::from_prompts(
            self.name.as_deref().unwrap_or_default(),
            self.age.as_deref().unwrap_or_default(),
            self.email.as_deref().unwrap_or_default(),
        )
    }
}

/// Omitted flags, blank values and `NA` keep the current value.
#[derive(Args)]
struct CourseEditArgs {
    id: String,
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    instructor: Option<String>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Some(log_dir) = cli.log_dir.as_ref() {
        if let Err(message) = start_logging(cli.log_level.as_deref(), log_dir) {
            eprintln!("error: {message}");
            return ExitCode::FAILURE;
        }
    }

    if let Command::Ping = cli.command {
        println!("school_core ping={}", school_core::ping());
        println!("school_core version={}", school_core::core_version());
        return ExitCode::SUCCESS;
    }

    let config = StoreConfig {
        db_path: cli.db.clone(),
        create_schema: !cli.no_create_schema,
    };
    let mut store = match RecordStore::open(&config) {
        Ok(store) => store,
        Err(err) => return report_error(&err),
    };

    let status = match run(&mut store, &cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => report_error(&err),
    };

    if let Err(err) = store.close() {
        eprintln!("error: {err}");
        return ExitCode::FAILURE;
    }
    status
}

fn run(store: &mut RecordStore, cli: &Cli) -> Result<(), RepoError> {
    let json = cli.json;
    let mut service = store.service();

    match &cli.command {
        Command::Ping => {}
        Command::AddStudent(args) => {
            service.add_student(&args.id, &args.name, &args.age, &args.email)?;
            render::done("student added", json);
        }
        Command::AddInstructor(args) => {
            service.add_instructor(&args.id, &args.name, &args.age, &args.email)?;
            render::done("instructor added", json);
        }
        Command::AddCourse { id, name } => {
            service.add_course(id, name)?;
            render::done("course added", json);
        }
        Command::CourseIds => {
            render::ids(&service.list_course_ids()?, json);
        }
        Command::Register {
            student_id,
            course_id,
        } => {
            service.register_student_for_course(student_id, course_id)?;
            render::done(&format!("student {student_id} registered for {course_id}"), json);
        }
        Command::Assign {
            instructor_id,
            course_id,
        } => {
            service.assign_instructor_to_course(instructor_id, course_id)?;
            render::done(
                &format!("instructor {instructor_id} assigned to course {course_id}"),
                json,
            );
        }
        Command::List { kind } => {
            render::rows(&service.list_all(*kind)?, json);
        }
        Command::Search { kind, field, term } => {
            render::rows(&service.search(*kind, *field, term)?, json);
        }
        Command::EditStudent(args) => {
            let outcome =
                service.edit_record(RecordKind::Student, &args.id, &args.to_edit().into())?;
            render::edit(&outcome, json);
        }
        Command::EditInstructor(args) => {
            let outcome =
                service.edit_record(RecordKind::Instructor, &args.id, &args.to_edit().into())?;
            render::edit(&outcome, json);
        }
        Command::EditCourse(args) => {
            let edit = CourseEdit::from_prompts(
                args.name.as_deref().unwrap_or_default(),
                args.instructor.as_deref().unwrap_or_default(),
            );
            let outcome = service.edit_record(RecordKind::Course, &args.id, &edit.into())?;
            render::edit(&outcome, json);
        }
        Command::Delete { kind, id } => {
            service.delete_record(*kind, id)?;
            render::done(&format!("{kind} {id} deleted"), json);
        }
    }

    Ok(())
}

fn start_logging(level: Option<&str>, log_dir: &Path) -> Result<(), String> {
    let absolute = if log_dir.is_absolute() {
        log_dir.to_path_buf()
    } else {
        std::env::current_dir()
            .map_err(|err| format!("cannot resolve log directory: {err}"))?
            .join(log_dir)
    };
    let log_dir = absolute
        .to_str()
        .ok_or_else(|| "log directory must be valid UTF-8".to_string())?;

    init_logging(level.unwrap_or(default_log_level()), log_dir).map_err(|err| err.to_string())
}

fn report_error(err: &RepoError) -> ExitCode {
    let kind = err.kind();
    eprintln!("error [{kind}]: {err}");
    ExitCode::from(match kind {
        ErrorKind::Storage => 1,
        ErrorKind::Validation => 2,
        ErrorKind::NotFound => 3,
        ErrorKind::DuplicateKey => 4,
        ErrorKind::Conflict => 5,
    })
}

//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the data access contract for the four school relations.
//! - Isolate SQLite query details from service orchestration.
//!
//! # Invariants
//! - Every mutating call runs inside one immediate transaction.
//! - Repository APIs return semantic errors (`NotFound`, `DuplicateKey`,
//!   `Conflict`) in addition to storage errors.

pub mod record_repo;
mod rows;
pub mod schema_check;

//! Core use-case services.
//!
//! # Responsibility
//! - Accept raw caller input and turn it into validated repository calls.
//! - Emit one structured log event per use-case call.
//! - Keep presentation layers decoupled from storage details.

pub mod record_service;

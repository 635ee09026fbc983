//! Domain models for student records.
//!
//! This module contains the record types, the validated field types they are
//! built from, and configuration.

/// Student record and its mutations.
pub mod student;
pub use student::{Student, StudentField, StudentUpdate};

mod course;
pub use course::Course;

mod config;
pub use config::Config;

/// Validated field types.
pub mod field;
pub use field::{CourseCode, Grade, InvalidInput, Name};

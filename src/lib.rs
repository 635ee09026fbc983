//! Plain-text Student Records
//!
//! Students and courses are kept in memory and persisted as pipe-delimited
//! text files in a data directory.

pub mod domain;
pub use domain::{Config, Course, CourseCode, Grade, InvalidInput, Name, Student, StudentUpdate};

/// Flat-file persistence and the record repository.
pub mod storage;
pub use storage::{Database, Error, ParseError};

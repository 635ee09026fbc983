/// The record repository backed by flat files.
pub mod database;
/// Pipe-delimited line serialization for records.
pub mod line;

pub use database::{Database, Error, Key};
pub use line::{LineRecord, ParseError};

use std::{io, path::PathBuf};

use roster::{storage::Key, CourseCode, Database, Error, Name};
use tracing::instrument;

use super::{
    display::{self, OutputFormat},
    parse_course_code,
    terminal::Colorize,
};

#[derive(Debug, clap::Subcommand)]
pub enum Command {
    /// Add a new course
    Add {
        /// Unique course code (e.g. CS101)
        #[clap(value_parser = parse_course_code)]
        code: CourseCode,

        /// Course name
        name: Name,

        /// Credit value
        credits: u32,
    },

    /// Delete a course
    ///
    /// Enrollments and grades that reference the course are left in place.
    Delete {
        /// Code of the course to delete
        #[clap(value_parser = parse_course_code)]
        code: CourseCode,
    },

    /// Show a course
    Show {
        /// Code of the course to show
        #[clap(value_parser = parse_course_code)]
        code: CourseCode,

        /// Output format
        #[arg(long, value_name = "FORMAT", default_value = "pretty")]
        output: OutputFormat,
    },

    /// List all courses
    List {
        /// Output format
        #[arg(long, value_name = "FORMAT", default_value = "pretty")]
        output: OutputFormat,
    },
}

impl Command {
    #[instrument]
    pub fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let mut database = Database::open(root)?;

        match self {
            Self::Add {
                code,
                name,
                credits,
            } => {
                let course = database.add_course(code, name, credits)?;
                println!(
                    "{}",
                    format!("Added course {} ({})", course.code(), course.name()).success()
                );
            }
            Self::Delete { code } => {
                let course = database.delete_course(&code)?;
                println!(
                    "{}",
                    format!("Deleted course {} ({})", course.code(), course.name()).success()
                );
            }
            Self::Show { code, output } => {
                let course = database
                    .search_course(&code)
                    .ok_or(Error::NotFound(Key::Course(code)))?;
                let mut out = io::stdout().lock();
                match output {
                    OutputFormat::Pretty => display::course(&mut out, &course)?,
                    OutputFormat::Json => display::json(&mut out, &course)?,
                }
            }
            Self::List { output } => {
                let mut out = io::stdout().lock();
                match output {
                    OutputFormat::Pretty => display::courses(&mut out, database.courses())?,
                    OutputFormat::Json => display::json(&mut out, database.courses())?,
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;

    fn code(s: &str) -> CourseCode {
        CourseCode::new(s).unwrap()
    }

    fn add(root: &std::path::Path, c: &str, name: &str, credits: u32) -> anyhow::Result<()> {
        Command::Add {
            code: code(c),
            name: Name::new(name).unwrap(),
            credits,
        }
        .run(root.to_path_buf())
    }

    #[test]
    fn add_then_delete() {
        let tmp = tempdir().unwrap();
        add(tmp.path(), "CS101", "Intro", 3).expect("add should succeed");

        let course = Database::open(tmp.path())
            .unwrap()
            .search_course(&code("CS101"))
            .unwrap();
        assert_eq!(course.name().as_str(), "Intro");
        assert_eq!(course.credits(), 3);

        Command::Delete {
            code: code("CS101"),
        }
        .run(tmp.path().to_path_buf())
        .expect("delete should succeed");
        assert!(Database::open(tmp.path()).unwrap().courses().is_empty());
    }

    #[test]
    fn add_duplicate_fails() {
        let tmp = tempdir().unwrap();
        add(tmp.path(), "CS101", "Intro", 3).unwrap();

        let error = add(tmp.path(), "CS101", "Other", 4).unwrap_err();

        assert!(matches!(
            error.downcast_ref::<Error>(),
            Some(Error::AlreadyExists(Key::Course(_)))
        ));
        let course = Database::open(tmp.path())
            .unwrap()
            .search_course(&code("CS101"))
            .unwrap();
        assert_eq!(course.name().as_str(), "Intro");
    }

    #[test]
    fn delete_missing_course_fails() {
        let tmp = tempdir().unwrap();

        let error = Command::Delete {
            code: code("XX999"),
        }
        .run(tmp.path().to_path_buf())
        .unwrap_err();

        assert_eq!(error.to_string(), "course XX999 not found");
    }

    #[test]
    fn show_and_list_succeed() {
        let tmp = tempdir().unwrap();
        add(tmp.path(), "CS101", "Intro", 3).unwrap();

        for output in [OutputFormat::Pretty, OutputFormat::Json] {
            Command::Show {
                code: code("CS101"),
                output,
            }
            .run(tmp.path().to_path_buf())
            .expect("show should succeed");
            Command::List { output }
                .run(tmp.path().to_path_buf())
                .expect("list should succeed");
        }
    }
}

use std::{io, path::PathBuf};

use roster::{domain::StudentField, storage::Key, Database, Error, Name, StudentUpdate};
use tracing::instrument;

use super::{
    display::{self, OutputFormat, StudentSummary},
    terminal::Colorize,
};

#[derive(Debug, clap::Subcommand)]
pub enum Command {
    /// Add a new student
    Add {
        /// Unique roll number
        roll_no: u32,

        /// Full name
        name: Name,

        /// Age in years
        age: u32,
    },

    /// Delete a student
    Delete {
        /// Roll number of the student to delete
        roll_no: u32,
    },

    /// Change a student's name or age
    Update {
        /// Roll number of the student to update
        roll_no: u32,

        /// The field to change ('name' or 'age')
        field: StudentField,

        /// The new value
        value: String,
    },

    /// Show a student's details, courses, grades and GPA
    Show {
        /// Roll number of the student to show
        roll_no: u32,

        /// Output format
        #[arg(long, value_name = "FORMAT", default_value = "pretty")]
        output: OutputFormat,
    },

    /// List all students
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
            Self::Add { roll_no, name, age } => {
                let student = database.add_student(roll_no, name, age)?;
                println!(
                    "{}",
                    format!("Added student {} ({})", student.roll_no(), student.name()).success()
                );
            }
            Self::Delete { roll_no } => {
                let student = database.delete_student(roll_no)?;
                println!(
                    "{}",
                    format!("Deleted student {} ({})", student.roll_no(), student.name()).success()
                );
            }
            Self::Update {
                roll_no,
                field,
                value,
            } => {
                let update = StudentUpdate::parse(field, &value)?;
                database.update_student(roll_no, update)?;
                println!(
                    "{}",
                    format!("Updated {field} of student {roll_no}").success()
                );
            }
            Self::Show { roll_no, output } => {
                let student = database
                    .search_student(roll_no)
                    .ok_or(Error::NotFound(Key::Student(roll_no)))?;
                let mut out = io::stdout().lock();
                match output {
                    OutputFormat::Pretty => display::student(&mut out, &student)?,
                    OutputFormat::Json => display::json(&mut out, &StudentSummary::from(&student))?,
                }
            }
            Self::List { output } => {
                let mut out = io::stdout().lock();
                match output {
                    OutputFormat::Pretty => display::students(&mut out, database.students())?,
                    OutputFormat::Json => {
                        let summaries: Vec<StudentSummary<'_>> =
                            database.students().iter().map(StudentSummary::from).collect();
                        display::json(&mut out, &summaries)?;
                    }
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

    fn add(root: &std::path::Path, roll_no: u32, name: &str, age: u32) -> anyhow::Result<()> {
        Command::Add {
            roll_no,
            name: Name::new(name).unwrap(),
            age,
        }
        .run(root.to_path_buf())
    }

    #[test]
    fn add_then_update_then_delete() {
        let tmp = tempdir().unwrap();
        add(tmp.path(), 1, "Alice", 20).expect("add should succeed");

        Command::Update {
            roll_no: 1,
            field: StudentField::Name,
            value: "Alicia".to_string(),
        }
        .run(tmp.path().to_path_buf())
        .expect("update should succeed");

        let student = Database::open(tmp.path()).unwrap().search_student(1).unwrap();
        assert_eq!(student.name().as_str(), "Alicia");
        assert_eq!(student.age(), 20);

        Command::Delete { roll_no: 1 }
            .run(tmp.path().to_path_buf())
            .expect("delete should succeed");
        assert!(Database::open(tmp.path()).unwrap().students().is_empty());
    }

    #[test]
    fn add_duplicate_fails() {
        let tmp = tempdir().unwrap();
        add(tmp.path(), 1, "Alice", 20).unwrap();

        let error = add(tmp.path(), 1, "Bob", 30).unwrap_err();

        assert!(matches!(
            error.downcast_ref::<Error>(),
            Some(Error::AlreadyExists(Key::Student(1)))
        ));
    }

    #[test]
    fn update_with_bad_age_changes_nothing() {
        let tmp = tempdir().unwrap();
        add(tmp.path(), 1, "Alice", 20).unwrap();

        let result = Command::Update {
            roll_no: 1,
            field: StudentField::Age,
            value: "abc".to_string(),
        }
        .run(tmp.path().to_path_buf());

        assert!(result.is_err());
        let student = Database::open(tmp.path()).unwrap().search_student(1).unwrap();
        assert_eq!(student.age(), 20);
    }

    #[test]
    fn show_missing_student_fails() {
        let tmp = tempdir().unwrap();

        let error = Command::Show {
            roll_no: 3,
            output: OutputFormat::Pretty,
        }
        .run(tmp.path().to_path_buf())
        .unwrap_err();

        assert_eq!(error.to_string(), "student with roll number 3 not found");
    }

    #[test]
    fn list_succeeds_in_both_formats() {
        let tmp = tempdir().unwrap();
        add(tmp.path(), 1, "Alice", 20).unwrap();

        for output in [OutputFormat::Pretty, OutputFormat::Json] {
            Command::List { output }
                .run(tmp.path().to_path_buf())
                .expect("list should succeed");
        }
    }
}

use std::path::PathBuf;

mod course;
mod display;
mod init;
mod menu;
mod student;
mod terminal;

use clap::ArgAction;
use roster::{CourseCode, Database};
use terminal::Colorize;
use tracing::instrument;

/// Parse a course code from a string, ignoring surrounding whitespace.
///
/// Codes match by exact text, the same as in the menu, so case is kept.
fn parse_course_code(s: &str) -> Result<CourseCode, String> {
    CourseCode::new(s.trim()).map_err(|e| format!("{e}"))
}

#[derive(Debug, clap::Parser)]
#[command(version, about)]
pub struct Cli {
    /// Verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// The directory holding the record files
    #[arg(short, long, default_value = ".", global = true)]
    root: PathBuf,

    #[command(subcommand)]
    command: Option<Command>,
}

impl Cli {
    pub fn run(self) -> anyhow::Result<()> {
        Self::setup_logging(self.verbose);

        match self.command {
            Some(command) => command.run(self.root),
            None => menu::run(self.root),
        }
    }

    fn setup_logging(verbosity: u8) {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

        let level = match verbosity {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        };

        let filter = tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into());

        // stdout belongs to the menu
        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_thread_names(false)
            .with_line_number(false);

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    }
}

#[derive(Debug, clap::Parser)]
pub enum Command {
    /// Write a default configuration file to the root directory
    Init(init::Command),

    /// Manage students
    #[command(subcommand)]
    Student(student::Command),

    /// Manage courses
    #[command(subcommand)]
    Course(course::Command),

    /// Enroll a student in a course
    Enroll(Enroll),

    /// Record a grade for a student
    ///
    /// The course does not need to be one the student is enrolled in.
    Grade(Grade),
}

impl Command {
    fn run(self, root: PathBuf) -> anyhow::Result<()> {
        match self {
            Self::Init(command) => command.run(&root)?,
            Self::Student(command) => command.run(root)?,
            Self::Course(command) => command.run(root)?,
            Self::Enroll(command) => command.run(root)?,
            Self::Grade(command) => command.run(root)?,
        }
        Ok(())
    }
}

#[derive(Debug, clap::Parser)]
pub struct Enroll {
    /// The roll number of the student
    roll_no: u32,

    /// The code of the course
    #[clap(value_parser = parse_course_code)]
    code: CourseCode,
}

impl Enroll {
    #[instrument]
    fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let mut database = Database::open(root)?;
        database.enroll(self.roll_no, &self.code)?;

        println!(
            "{}",
            format!("Enrolled student {} in {}", self.roll_no, self.code).success()
        );
        Ok(())
    }
}

#[derive(Debug, clap::Parser)]
pub struct Grade {
    /// The roll number of the student
    roll_no: u32,

    /// The code of the course
    #[clap(value_parser = parse_course_code)]
    code: CourseCode,

    /// The grade, between 0 and 10
    grade: f32,
}

impl Grade {
    #[instrument]
    fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let mut database = Database::open(root)?;
        let code = self.code.clone();
        let previous = database.add_grade(self.roll_no, self.code, self.grade)?;

        let message = format!(
            "Recorded grade {} for student {} in {code}",
            self.grade, self.roll_no
        );
        println!("{}", message.success());
        if let Some(previous) = previous {
            println!("{}", format!("  (replaced {previous})").warning());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use roster::{Error, Name};
    use tempfile::tempdir;

    use super::*;

    fn code(s: &str) -> CourseCode {
        CourseCode::new(s).unwrap()
    }

    fn seeded(root: &std::path::Path) {
        let mut database = Database::open(root).unwrap();
        database
            .add_student(1, Name::new("Alice").unwrap(), 20)
            .unwrap();
        database
            .add_course(code("CS101"), Name::new("Intro").unwrap(), 3)
            .unwrap();
    }

    #[test]
    fn parse_course_code_trims_and_keeps_case() {
        assert_eq!(parse_course_code(" cs101 ").unwrap(), code("cs101"));
        assert_ne!(parse_course_code("cs101").unwrap(), code("CS101"));
        assert!(parse_course_code("CS 101").is_err());
    }

    #[test]
    fn course_added_in_menu_is_usable_from_subcommands() {
        let tmp = tempdir().unwrap();
        let mut database = Database::open(tmp.path()).unwrap();
        let input = "1\n1\nAlice\n20\n6\ncs101\nIntro\n3\n0\n";
        let mut output = Vec::new();
        menu::Session::new(&mut database, input.as_bytes(), &mut output)
            .run()
            .unwrap();

        let enroll = Enroll {
            roll_no: 1,
            code: parse_course_code("cs101").unwrap(),
        };
        enroll.run(tmp.path().to_path_buf()).expect("enroll should find the course");

        let grade = Grade {
            roll_no: 1,
            code: parse_course_code("cs101").unwrap(),
            grade: 7.5,
        };
        grade.run(tmp.path().to_path_buf()).unwrap();

        let student = Database::open(tmp.path()).unwrap().search_student(1).unwrap();
        assert_eq!(student.courses(), &[code("cs101")]);
        assert!(student.grade(&code("cs101")).is_some());
    }

    #[test]
    fn enroll_run_enrolls_student() {
        let tmp = tempdir().unwrap();
        seeded(tmp.path());

        let enroll = Enroll {
            roll_no: 1,
            code: code("CS101"),
        };
        enroll.run(tmp.path().to_path_buf()).unwrap();

        let student = Database::open(tmp.path()).unwrap().search_student(1).unwrap();
        assert_eq!(student.courses(), &[code("CS101")]);
    }

    #[test]
    fn enroll_run_twice_fails() {
        let tmp = tempdir().unwrap();
        seeded(tmp.path());

        let enroll = || Enroll {
            roll_no: 1,
            code: code("CS101"),
        };
        enroll().run(tmp.path().to_path_buf()).unwrap();
        let error = enroll().run(tmp.path().to_path_buf()).unwrap_err();

        assert!(matches!(
            error.downcast_ref::<Error>(),
            Some(Error::AlreadyEnrolled { roll_no: 1, .. })
        ));
    }

    #[test]
    fn grade_run_records_grade() {
        let tmp = tempdir().unwrap();
        seeded(tmp.path());

        let grade = Grade {
            roll_no: 1,
            code: code("MA201"),
            grade: 8.5,
        };
        grade.run(tmp.path().to_path_buf()).unwrap();

        let student = Database::open(tmp.path()).unwrap().search_student(1).unwrap();
        let recorded = student.grade(&code("MA201")).unwrap();
        assert!((recorded.value() - 8.5).abs() < f32::EPSILON);
    }

    #[test]
    fn grade_run_for_missing_student_fails() {
        let tmp = tempdir().unwrap();

        let grade = Grade {
            roll_no: 9,
            code: code("CS101"),
            grade: 5.0,
        };
        let error = grade.run(tmp.path().to_path_buf()).unwrap_err();

        assert!(matches!(
            error.downcast_ref::<Error>(),
            Some(Error::NotFound(_))
        ));
    }
}

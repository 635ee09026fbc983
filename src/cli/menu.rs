//! The interactive numbered menu.
//!
//! Each menu entry collects its inputs, calls one [`Database`] operation and
//! reports the outcome. Failures are reported and the session carries on;
//! only a failure to read input or write output ends it.

use std::{
    io::{self, BufRead, Write},
    path::PathBuf,
};

use roster::{
    domain::{field::parse_number, StudentField},
    storage::Key,
    CourseCode, Database, Error, InvalidInput, Name, StudentUpdate,
};
use tracing::instrument;

use super::{
    display,
    terminal::{rule, Colorize},
};

const MENU: &str = "
--- STUDENT OPERATIONS ---
1. Add Student
2. Delete Student
3. Update Student
4. Search Student
5. Display All Students

--- COURSE OPERATIONS ---
6. Add Course
7. Delete Course
8. Display All Courses

--- ENROLLMENT OPERATIONS ---
9. Enroll Student in Course
10. Add Grade to Student

0. Exit
";

/// Input ended while the session was waiting for a value.
#[derive(Debug, thiserror::Error)]
#[error("end of input")]
struct EndOfInput;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Choice {
    Exit,
    AddStudent,
    DeleteStudent,
    UpdateStudent,
    SearchStudent,
    ListStudents,
    AddCourse,
    DeleteCourse,
    ListCourses,
    Enroll,
    AddGrade,
}

impl Choice {
    const fn from_number(number: u32) -> Option<Self> {
        Some(match number {
            0 => Self::Exit,
            1 => Self::AddStudent,
            2 => Self::DeleteStudent,
            3 => Self::UpdateStudent,
            4 => Self::SearchStudent,
            5 => Self::ListStudents,
            6 => Self::AddCourse,
            7 => Self::DeleteCourse,
            8 => Self::ListCourses,
            9 => Self::Enroll,
            10 => Self::AddGrade,
            _ => return None,
        })
    }
}

/// Runs the menu on standard input and output against the records in `root`.
#[instrument]
pub fn run(root: PathBuf) -> anyhow::Result<()> {
    let mut database = Database::open(root)?;
    let stdin = io::stdin();
    let stdout = io::stdout();
    Session::new(&mut database, stdin.lock(), stdout.lock()).run()
}

/// One interactive session over a database.
pub struct Session<'db, R, W> {
    database: &'db mut Database,
    input: R,
    output: W,
}

impl<'db, R: BufRead, W: Write> Session<'db, R, W> {
    #[must_use]
    pub const fn new(database: &'db mut Database, input: R, output: W) -> Self {
        Self {
            database,
            input,
            output,
        }
    }

    /// Runs the menu loop until the user exits or input ends.
    ///
    /// # Errors
    ///
    /// Returns an error only if reading input or writing output fails.
    pub fn run(mut self) -> anyhow::Result<()> {
        let rule = rule('=');
        writeln!(self.output, "\n{rule}")?;
        writeln!(self.output, "  Welcome to Student Management System")?;
        writeln!(self.output, "{rule}")?;

        loop {
            self.print_menu()?;

            let Some(line) = self.read_line()? else {
                tracing::debug!("Input closed, ending session");
                break;
            };

            let Ok(number) = line.trim().parse::<u32>() else {
                writeln!(self.output, "{}", "Invalid input! Please enter a number.".failure())?;
                continue;
            };

            let Some(choice) = Choice::from_number(number) else {
                writeln!(self.output, "\n{}", "Invalid choice! Please try again.".failure())?;
                continue;
            };

            if choice == Choice::Exit {
                writeln!(self.output, "\nThank you for using Student Management System!")?;
                writeln!(self.output, "All data has been saved. Goodbye!")?;
                break;
            }

            match self.dispatch(choice) {
                Ok(()) => {}
                Err(error) if error.is::<EndOfInput>() => {
                    tracing::debug!("Input closed mid-command, ending session");
                    break;
                }
                Err(error) if error.is::<io::Error>() => return Err(error),
                Err(error) => self.report(&error)?,
            }
        }

        Ok(())
    }

    fn print_menu(&mut self) -> io::Result<()> {
        writeln!(self.output, "\n{}", "STUDENT MANAGEMENT SYSTEM".heading())?;
        write!(self.output, "{MENU}")?;
        write!(self.output, "\nEnter your choice: ")?;
        self.output.flush()
    }

    fn dispatch(&mut self, choice: Choice) -> anyhow::Result<()> {
        tracing::debug!(?choice, "Running menu command");
        match choice {
            Choice::Exit => Ok(()),
            Choice::AddStudent => self.add_student(),
            Choice::DeleteStudent => self.delete_student(),
            Choice::UpdateStudent => self.update_student(),
            Choice::SearchStudent => self.search_student(),
            Choice::ListStudents => Ok(display::students(&mut self.output, self.database.students())?),
            Choice::AddCourse => self.add_course(),
            Choice::DeleteCourse => self.delete_course(),
            Choice::ListCourses => Ok(display::courses(&mut self.output, self.database.courses())?),
            Choice::Enroll => self.enroll(),
            Choice::AddGrade => self.add_grade(),
        }
    }

    fn report(&mut self, error: &anyhow::Error) -> io::Result<()> {
        tracing::debug!("Command failed: {error:?}");
        let message = format!("Error: {error:#}");
        let styled = if matches!(
            error.downcast_ref::<Error>(),
            Some(Error::AlreadyEnrolled { .. })
        ) {
            message.warning()
        } else {
            message.failure()
        };
        writeln!(self.output, "{styled}")
    }

    fn read_line(&mut self) -> io::Result<Option<String>> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\n', '\r']).to_string()))
    }

    fn prompt(&mut self, label: &str) -> anyhow::Result<String> {
        write!(self.output, "{label}: ")?;
        self.output.flush()?;
        self.read_line()?.ok_or_else(|| EndOfInput.into())
    }

    fn prompt_number(&mut self, label: &str, field: &'static str) -> anyhow::Result<u32> {
        let value = self.prompt(label)?;
        Ok(parse_number(field, &value)?)
    }

    fn prompt_name(&mut self, label: &str) -> anyhow::Result<Name> {
        Ok(Name::new(self.prompt(label)?)?)
    }

    fn prompt_code(&mut self, label: &str) -> anyhow::Result<CourseCode> {
        Ok(CourseCode::new(self.prompt(label)?.trim())?)
    }

    fn section(&mut self, title: &str) -> io::Result<()> {
        writeln!(self.output, "\n--- {title} ---")
    }

    fn success(&mut self, message: &str) -> anyhow::Result<()> {
        writeln!(self.output, "{}", message.success())?;
        Ok(())
    }

    fn add_student(&mut self) -> anyhow::Result<()> {
        self.section("Add New Student")?;
        let roll_no = self.prompt_number("Enter Roll Number", "roll number")?;
        let name = self.prompt_name("Enter Name")?;
        let age = self.prompt_number("Enter Age", "age")?;

        self.database.add_student(roll_no, name, age)?;
        self.success("Student added successfully!")
    }

    fn delete_student(&mut self) -> anyhow::Result<()> {
        self.section("Delete Student")?;
        let roll_no = self.prompt_number("Enter Roll Number to delete", "roll number")?;

        self.database.delete_student(roll_no)?;
        self.success("Student deleted successfully!")
    }

    fn update_student(&mut self) -> anyhow::Result<()> {
        self.section("Update Student")?;
        let roll_no = self.prompt_number("Enter Roll Number to update", "roll number")?;
        if self.database.search_student(roll_no).is_none() {
            return Err(Error::NotFound(Key::Student(roll_no)).into());
        }

        writeln!(self.output, "\nWhat do you want to update?")?;
        writeln!(self.output, "1. Name")?;
        writeln!(self.output, "2. Age")?;
        let field: StudentField = self.prompt("Enter choice")?.parse()?;

        let value = match field {
            StudentField::Name => self.prompt("Enter new name")?,
            StudentField::Age => self.prompt("Enter new age")?,
        };
        let update = StudentUpdate::parse(field, &value)?;

        self.database.update_student(roll_no, update)?;
        match field {
            StudentField::Name => self.success("Name updated successfully!"),
            StudentField::Age => self.success("Age updated successfully!"),
        }
    }

    fn search_student(&mut self) -> anyhow::Result<()> {
        self.section("Search Student")?;
        let roll_no = self.prompt_number("Enter Roll Number to search", "roll number")?;

        match self.database.search_student(roll_no) {
            Some(student) => display::student(&mut self.output, &student)?,
            None => writeln!(self.output, "{}", "Student not found!".failure())?,
        }
        Ok(())
    }

    fn add_course(&mut self) -> anyhow::Result<()> {
        self.section("Add New Course")?;
        let code = self.prompt_code("Enter Course Code (e.g., CS101)")?;
        let name = self.prompt_name("Enter Course Name")?;
        let credits = self.prompt_number("Enter Credits", "credits")?;

        self.database.add_course(code, name, credits)?;
        self.success("Course added successfully!")
    }

    fn delete_course(&mut self) -> anyhow::Result<()> {
        self.section("Delete Course")?;
        let code = self.prompt_code("Enter Course Code to delete")?;

        self.database.delete_course(&code)?;
        self.success("Course deleted successfully!")
    }

    fn enroll(&mut self) -> anyhow::Result<()> {
        self.section("Enroll Student in Course")?;
        let roll_no = self.prompt_number("Enter Student Roll Number", "roll number")?;
        let code = self.prompt_code("Enter Course Code")?;

        self.database.enroll(roll_no, &code)?;
        self.success(&format!("Course {code} added successfully!"))
    }

    fn add_grade(&mut self) -> anyhow::Result<()> {
        self.section("Add Grade")?;
        let roll_no = self.prompt_number("Enter Student Roll Number", "roll number")?;
        let code = self.prompt_code("Enter Course Code")?;
        let text = self.prompt("Enter Grade (0-10)")?;
        let grade = text.trim().parse::<f32>().map_err(|_| InvalidInput::Number {
            field: "grade",
            value: text.clone(),
        })?;

        self.database.add_grade(roll_no, code, grade)?;
        self.success("Grade added successfully!")
    }
}

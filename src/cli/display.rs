//! Human-readable and JSON rendering of records.

use std::io::{self, Write};

use anyhow::Context;
use roster::{Course, Student};
use serde::Serialize;

use super::terminal::{rule, Colorize};

/// Output format for `show` and `list` commands.
#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text
    #[default]
    Pretty,
    /// Pretty-printed JSON
    Json,
}

/// A student together with its derived GPA, for JSON output.
#[derive(Debug, Serialize)]
pub struct StudentSummary<'a> {
    #[serde(flatten)]
    student: &'a Student,
    gpa: f32,
}

impl<'a> From<&'a Student> for StudentSummary<'a> {
    fn from(student: &'a Student) -> Self {
        Self {
            student,
            gpa: student.gpa(),
        }
    }
}

/// Writes the full details of a student.
///
/// Each enrolled course is listed with its grade, when one is recorded. The
/// GPA is only shown once the student has a non-zero average.
pub fn student<W: Write>(out: &mut W, student: &Student) -> io::Result<()> {
    let rule = rule('=');
    writeln!(out, "\n{rule}")?;
    writeln!(out, "Roll No: {}", student.roll_no())?;
    writeln!(out, "Name: {}", student.name())?;
    writeln!(out, "Age: {}", student.age())?;

    write!(out, "\n{}", "Enrolled Courses:".heading())?;
    if student.courses().is_empty() {
        writeln!(out, " No courses enrolled")?;
    } else {
        writeln!(out)?;
        for code in student.courses() {
            match student.grade(code) {
                Some(grade) => writeln!(out, "  - {code} (Grade: {:.2})", grade.value())?,
                None => writeln!(out, "  - {code}")?,
            }
        }
    }

    let gpa = student.gpa();
    if gpa > 0.0 {
        writeln!(out, "\nGPA: {gpa:.2}")?;
    }
    writeln!(out, "{rule}")
}

/// Writes every student, or a notice if there are none.
pub fn students<W: Write>(out: &mut W, students: &[Student]) -> io::Result<()> {
    if students.is_empty() {
        return writeln!(out, "\nNo students in the database!");
    }

    writeln!(out, "\n{}", "ALL STUDENTS".heading())?;
    for s in students {
        student(out, s)?;
    }
    Ok(())
}

/// Writes the details of a course.
pub fn course<W: Write>(out: &mut W, course: &Course) -> io::Result<()> {
    writeln!(out, "Course Code: {}", course.code())?;
    writeln!(out, "Course Name: {}", course.name())?;
    writeln!(out, "Credits: {}", course.credits())?;
    writeln!(out, "{}", rule('-'))
}

/// Writes every course, or a notice if there are none.
pub fn courses<W: Write>(out: &mut W, courses: &[Course]) -> io::Result<()> {
    if courses.is_empty() {
        return writeln!(out, "\nNo courses available!");
    }

    writeln!(out, "\n{}", "ALL COURSES".heading())?;
    for c in courses {
        course(out, c)?;
    }
    Ok(())
}

/// Writes `value` as pretty-printed JSON followed by a newline.
pub fn json<W: Write, T: Serialize + ?Sized>(out: &mut W, value: &T) -> anyhow::Result<()> {
    serde_json::to_writer_pretty(&mut *out, value).context("failed to render json output")?;
    writeln!(out)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use roster::{CourseCode, Grade, Name};

    use super::*;

    fn render(f: impl FnOnce(&mut Vec<u8>) -> io::Result<()>) -> String {
        let mut buffer = Vec::new();
        f(&mut buffer).unwrap();
        String::from_utf8(buffer).unwrap()
    }

    fn graded_student() -> Student {
        let cs101 = CourseCode::new("CS101").unwrap();
        let mut s = Student::new(1, Name::new("Alice").unwrap(), 20);
        s.enroll(cs101.clone());
        s.enroll(CourseCode::new("MA201").unwrap());
        s.record_grade(cs101, Grade::new(9.5).unwrap());
        s
    }

    #[test]
    fn student_lists_courses_with_grades_and_gpa() {
        let output = render(|out| student(out, &graded_student()));

        assert!(output.contains("Roll No: 1"));
        assert!(output.contains("Name: Alice"));
        assert!(output.contains("  - CS101 (Grade: 9.50)"));
        assert!(output.contains("  - MA201\n"));
        assert!(output.contains("GPA: 9.50"));
    }

    #[test]
    fn student_without_grades_has_no_gpa_line() {
        let s = Student::new(2, Name::new("Bob").unwrap(), 30);
        let output = render(|out| student(out, &s));

        assert!(output.contains("No courses enrolled"));
        assert!(!output.contains("GPA"));
    }

    #[test]
    fn empty_collections_print_notice() {
        assert!(render(|out| students(out, &[])).contains("No students in the database!"));
        assert!(render(|out| courses(out, &[])).contains("No courses available!"));
    }

    #[test]
    fn course_lists_fields() {
        let c = Course::new(
            CourseCode::new("CS101").unwrap(),
            Name::new("Intro").unwrap(),
            3,
        );
        let output = render(|out| course(out, &c));

        assert!(output.contains("Course Code: CS101"));
        assert!(output.contains("Course Name: Intro"));
        assert!(output.contains("Credits: 3"));
    }

    #[test]
    fn student_summary_json_includes_gpa() {
        let s = graded_student();
        let mut buffer = Vec::new();
        json(&mut buffer, &StudentSummary::from(&s)).unwrap();

        let value: serde_json::Value = serde_json::from_slice(&buffer).unwrap();
        assert_eq!(value["roll_no"], 1);
        assert_eq!(value["name"], "Alice");
        assert_eq!(value["courses"], serde_json::json!(["CS101", "MA201"]));
        assert_eq!(value["grades"]["CS101"], 9.5);
        assert_eq!(value["gpa"], 9.5);
    }
}

//! Records are stored one per line with `|` between fields.
//!
//! ```text
//! students: rollNo|name|age|code1,code2|code1:grade1,code2:grade2
//! courses:  code|name|credits
//! ```
//!
//! Nothing is escaped. The field types reject values containing delimiter
//! characters, so any record that can be constructed can be written safely.

use crate::domain::{
    field::{parse_number, CourseCode, Grade, InvalidInput, Name},
    Course, Student,
};

/// A record with a one-line text representation.
pub trait LineRecord: Sized {
    /// Serializes the record to a single line (without the line terminator).
    fn to_line(&self) -> String;

    /// Parses a record from a single line.
    ///
    /// # Errors
    ///
    /// Returns a [`ParseError`] if the line does not have the expected shape
    /// or a field value is invalid.
    fn from_line(line: &str) -> Result<Self, ParseError>;
}

/// Errors that can occur when parsing a record line.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParseError {
    /// The line has fewer fields than required.
    #[error("expected at least {expected} fields, found {found}")]
    MissingFields {
        /// The minimum number of fields.
        expected: usize,
        /// The number of fields present.
        found: usize,
    },

    /// The line has more fields than allowed.
    #[error("expected at most {expected} fields, found {found}")]
    TooManyFields {
        /// The maximum number of fields.
        expected: usize,
        /// The number of fields present.
        found: usize,
    },

    /// A grade entry is not of the form `CODE:GRADE`.
    #[error("malformed grade entry '{0}': expected CODE:GRADE")]
    GradeEntry(String),

    /// A field value was rejected.
    #[error(transparent)]
    Invalid(#[from] InvalidInput),
}

fn split_fields(line: &str, min: usize, max: usize) -> Result<Vec<&str>, ParseError> {
    let fields: Vec<&str> = line.split('|').collect();
    if fields.len() < min {
        return Err(ParseError::MissingFields {
            expected: min,
            found: fields.len(),
        });
    }
    if fields.len() > max {
        return Err(ParseError::TooManyFields {
            expected: max,
            found: fields.len(),
        });
    }
    Ok(fields)
}

/// Non-empty entries of a comma-separated segment.
fn list_entries(segment: &str) -> impl Iterator<Item = &str> {
    segment
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
}

fn parse_grade_entry(entry: &str) -> Result<(CourseCode, Grade), ParseError> {
    let (code, grade) = entry
        .split_once(':')
        .ok_or_else(|| ParseError::GradeEntry(entry.to_string()))?;
    Ok((CourseCode::new(code.trim())?, grade.parse()?))
}

impl LineRecord for Student {
    fn to_line(&self) -> String {
        let courses = self
            .courses()
            .iter()
            .map(CourseCode::as_str)
            .collect::<Vec<_>>()
            .join(",");
        let grades = self
            .grades()
            .iter()
            .map(|(code, grade)| format!("{code}:{grade}"))
            .collect::<Vec<_>>()
            .join(",");

        format!(
            "{}|{}|{}|{courses}|{grades}",
            self.roll_no(),
            self.name(),
            self.age()
        )
    }

    /// Lines written by older versions may omit the trailing course and grade
    /// segments; they are read as empty.
    fn from_line(line: &str) -> Result<Self, ParseError> {
        let fields = split_fields(line, 3, 5)?;

        let roll_no = parse_number("roll number", fields[0])?;
        let name = Name::new(fields[1])?;
        let age = parse_number("age", fields[2])?;

        let courses = fields
            .get(3)
            .copied()
            .map(list_entries)
            .into_iter()
            .flatten()
            .map(CourseCode::new)
            .collect::<Result<Vec<_>, _>>()?;

        let grades = fields
            .get(4)
            .copied()
            .map(list_entries)
            .into_iter()
            .flatten()
            .map(parse_grade_entry)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self::from_parts(roll_no, name, age, courses, grades))
    }
}

impl LineRecord for Course {
    fn to_line(&self) -> String {
        format!("{}|{}|{}", self.code(), self.name(), self.credits())
    }

    fn from_line(line: &str) -> Result<Self, ParseError> {
        let fields = split_fields(line, 3, 3)?;

        let code = CourseCode::new(fields[0].trim())?;
        let name = Name::new(fields[1])?;
        let credits = parse_number("credits", fields[2])?;

        Ok(Self::new(code, name, credits))
    }
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;

    fn code(s: &str) -> CourseCode {
        CourseCode::new(s).unwrap()
    }

    fn graded_student() -> Student {
        let mut student = Student::new(7, Name::new("Ada Lovelace").unwrap(), 36);
        student.enroll(code("MA201"));
        student.enroll(code("CS101"));
        student.record_grade(code("CS101"), Grade::new(9.5).unwrap());
        student.record_grade(code("MA201"), Grade::new(8.0).unwrap());
        student.record_grade(code("PH100"), Grade::new(7.25).unwrap());
        student
    }

    #[test]
    fn student_line_format() {
        assert_eq!(
            graded_student().to_line(),
            "7|Ada Lovelace|36|MA201,CS101|CS101:9.5,MA201:8,PH100:7.25"
        );
    }

    #[test]
    fn student_without_courses_renders_empty_segments() {
        let student = Student::new(1, Name::new("Alice").unwrap(), 20);
        assert_eq!(student.to_line(), "1|Alice|20||");
    }

    #[test]
    fn student_round_trip() {
        let student = graded_student();
        let parsed = Student::from_line(&student.to_line()).unwrap();

        assert_eq!(parsed, student);
        assert_eq!(parsed.courses(), &[code("MA201"), code("CS101")]);
    }

    #[test]
    fn student_round_trip_preserves_awkward_grades() {
        let mut student = Student::new(2, Name::new("Bob").unwrap(), 19);
        student.record_grade(code("A"), Grade::new(1.0 / 3.0).unwrap());
        student.record_grade(code("B"), Grade::new(0.0).unwrap());
        student.record_grade(code("C"), Grade::new(10.0).unwrap());

        let parsed = Student::from_line(&student.to_line()).unwrap();
        assert_eq!(parsed.grades(), student.grades());
    }

    #[test]
    fn student_name_may_contain_commas_and_colons() {
        let student = Student::new(3, Name::new("Smith, J: Jr").unwrap(), 40);
        let parsed = Student::from_line(&student.to_line()).unwrap();
        assert_eq!(parsed.name().as_str(), "Smith, J: Jr");
    }

    #[test]
    fn student_missing_trailing_segments_are_empty() {
        let student = Student::from_line("4|Dana|22").unwrap();
        assert!(student.courses().is_empty());
        assert!(student.grades().is_empty());
    }

    #[test]
    fn student_reads_grades_written_with_six_significant_digits() {
        let student = Student::from_line("5|Eve|23|CS101|CS101:6.66667").unwrap();
        let grade = student.grade(&code("CS101")).unwrap();
        assert!((grade.value() - 6.666_67).abs() < 1e-5);
    }

    #[test_case("x|Alice|20||", "roll number"; "non-numeric roll number")]
    #[test_case("1|Alice|twenty||", "age"; "non-numeric age")]
    #[test_case("1|Alice|-3||", "age"; "negative age")]
    fn student_rejects_bad_numbers(line: &str, field: &str) {
        match Student::from_line(line) {
            Err(ParseError::Invalid(InvalidInput::Number { field: f, .. })) => assert_eq!(f, field),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn student_rejects_bad_grade_value() {
        assert!(matches!(
            Student::from_line("1|Alice|20|CS101|CS101:abc"),
            Err(ParseError::Invalid(InvalidInput::Number { field: "grade", .. }))
        ));
    }

    #[test]
    fn student_rejects_out_of_range_grade() {
        assert!(matches!(
            Student::from_line("1|Alice|20|CS101|CS101:11"),
            Err(ParseError::Invalid(InvalidInput::GradeOutOfRange(_)))
        ));
    }

    #[test]
    fn student_rejects_grade_entry_without_colon() {
        assert_eq!(
            Student::from_line("1|Alice|20|CS101|CS101"),
            Err(ParseError::GradeEntry("CS101".to_string()))
        );
    }

    #[test]
    fn student_rejects_too_few_fields() {
        assert_eq!(
            Student::from_line("1|Alice"),
            Err(ParseError::MissingFields {
                expected: 3,
                found: 2
            })
        );
    }

    #[test]
    fn student_rejects_extra_fields() {
        assert_eq!(
            Student::from_line("1|Al|ice|20||"),
            Err(ParseError::TooManyFields {
                expected: 5,
                found: 6
            })
        );
    }

    #[test]
    fn course_line_format_and_round_trip() {
        let course = Course::new(code("CS101"), Name::new("Intro to Programming").unwrap(), 3);
        let line = course.to_line();

        assert_eq!(line, "CS101|Intro to Programming|3");
        assert_eq!(Course::from_line(&line).unwrap(), course);
    }

    #[test_case("CS101|Intro"; "missing credits")]
    #[test_case("CS101|Intro|3|extra"; "extra field")]
    #[test_case("CS101|Intro|three"; "non-numeric credits")]
    #[test_case("|Intro|3"; "empty code")]
    fn course_rejects(line: &str) {
        assert!(Course::from_line(line).is_err());
    }
}

use std::{collections::BTreeMap, fmt, str::FromStr};

use serde::Serialize;

use crate::domain::field::{parse_number, CourseCode, Grade, InvalidInput, Name};

/// A student enrolled at the institution.
///
/// The enrollment list and the grade map are independent: a grade can be
/// recorded for a course the student is not enrolled in.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Student {
    roll_no: u32,
    name: Name,
    age: u32,
    /// Enrolled course codes in enrollment order, without duplicates.
    courses: Vec<CourseCode>,
    /// Grades keyed by course code.
    grades: BTreeMap<CourseCode, Grade>,
}

impl Student {
    /// Creates a student with no enrollments and no grades.
    #[must_use]
    pub const fn new(roll_no: u32, name: Name, age: u32) -> Self {
        Self {
            roll_no,
            name,
            age,
            courses: Vec::new(),
            grades: BTreeMap::new(),
        }
    }

    /// Reassembles a student from its stored parts.
    ///
    /// Repeated course codes are collapsed to their first occurrence.
    pub(crate) fn from_parts(
        roll_no: u32,
        name: Name,
        age: u32,
        courses: impl IntoIterator<Item = CourseCode>,
        grades: impl IntoIterator<Item = (CourseCode, Grade)>,
    ) -> Self {
        let mut student = Self::new(roll_no, name, age);
        for code in courses {
            student.enroll(code);
        }
        student.grades.extend(grades);
        student
    }

    /// The roll number, unique among students.
    #[must_use]
    pub const fn roll_no(&self) -> u32 {
        self.roll_no
    }

    /// The student's name.
    #[must_use]
    pub const fn name(&self) -> &Name {
        &self.name
    }

    /// The student's age.
    #[must_use]
    pub const fn age(&self) -> u32 {
        self.age
    }

    /// Enrolled course codes, in enrollment order.
    #[must_use]
    pub fn courses(&self) -> &[CourseCode] {
        &self.courses
    }

    /// Recorded grades, ordered by course code.
    #[must_use]
    pub const fn grades(&self) -> &BTreeMap<CourseCode, Grade> {
        &self.grades
    }

    /// Replaces the student's name.
    pub fn set_name(&mut self, name: Name) {
        self.name = name;
    }

    /// Replaces the student's age.
    pub const fn set_age(&mut self, age: u32) {
        self.age = age;
    }

    /// Applies a single-field update.
    pub fn apply(&mut self, update: StudentUpdate) {
        match update {
            StudentUpdate::Name(name) => self.set_name(name),
            StudentUpdate::Age(age) => self.set_age(age),
        }
    }

    /// Returns `true` if the student is enrolled in the given course.
    #[must_use]
    pub fn is_enrolled(&self, code: &CourseCode) -> bool {
        self.courses.contains(code)
    }

    /// Adds a course to the enrollment list.
    ///
    /// Returns `true` if the course was added, `false` if the student was
    /// already enrolled in it.
    pub fn enroll(&mut self, code: CourseCode) -> bool {
        if self.is_enrolled(&code) {
            false
        } else {
            self.courses.push(code);
            true
        }
    }

    /// Returns the grade recorded for the given course, if any.
    #[must_use]
    pub fn grade(&self, code: &CourseCode) -> Option<Grade> {
        self.grades.get(code).copied()
    }

    /// Sets the grade for a course, returning the grade it replaced.
    pub fn record_grade(&mut self, code: CourseCode, grade: Grade) -> Option<Grade> {
        self.grades.insert(code, grade)
    }

    /// The unweighted mean of all recorded grades, or `0.0` if there are none.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn gpa(&self) -> f32 {
        if self.grades.is_empty() {
            return 0.0;
        }
        let total: f32 = self.grades.values().map(|grade| grade.value()).sum();
        total / self.grades.len() as f32
    }
}

/// The student fields that can be changed after creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StudentField {
    /// The student's name.
    Name,
    /// The student's age.
    Age,
}

impl fmt::Display for StudentField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Name => f.write_str("name"),
            Self::Age => f.write_str("age"),
        }
    }
}

/// Accepts the field name (case-insensitive) or its menu number (`1` for
/// name, `2` for age).
impl FromStr for StudentField {
    type Err = InvalidInput;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "1" | "name" => Ok(Self::Name),
            "2" | "age" => Ok(Self::Age),
            _ => Err(InvalidInput::Field(s.to_string())),
        }
    }
}

/// A change to a single student field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StudentUpdate {
    /// Replace the name.
    Name(Name),
    /// Replace the age.
    Age(u32),
}

impl StudentUpdate {
    /// Builds an update for `field` from its textual value.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidInput`] if the value is not valid for the field.
    pub fn parse(field: StudentField, value: &str) -> Result<Self, InvalidInput> {
        match field {
            StudentField::Name => Name::new(value).map(Self::Name),
            StudentField::Age => parse_number("age", value).map(Self::Age),
        }
    }

    /// The field this update changes.
    #[must_use]
    pub const fn field(&self) -> StudentField {
        match self {
            Self::Name(_) => StudentField::Name,
            Self::Age(_) => StudentField::Age,
        }
    }
}

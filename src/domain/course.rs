use serde::Serialize;

use crate::domain::field::{CourseCode, Name};

/// A course offered by the institution.
///
/// Courses are immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Course {
    code: CourseCode,
    name: Name,
    credits: u32,
}

impl Course {
    /// Creates a new course.
    #[must_use]
    pub const fn new(code: CourseCode, name: Name, credits: u32) -> Self {
        Self {
            code,
            name,
            credits,
        }
    }

    /// The course code, unique among courses.
    #[must_use]
    pub const fn code(&self) -> &CourseCode {
        &self.code
    }

    /// The course name.
    #[must_use]
    pub const fn name(&self) -> &Name {
        &self.name
    }

    /// The number of credits the course is worth.
    #[must_use]
    pub const fn credits(&self) -> u32 {
        self.credits
    }
}

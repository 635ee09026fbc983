use std::{fmt, ops::Deref, str::FromStr};

use non_empty_string::NonEmptyString;
use serde::Serialize;

/// Characters that delimit fields and list entries in the line format.
const DELIMITERS: [char; 3] = ['|', ',', ':'];

/// A validated course code.
///
/// Course codes are used as keys in the enrollment list and the grade map of
/// a student, so they must not contain any of the line format delimiters
/// (`|`, `,`, `:`) or whitespace.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CourseCode(NonEmptyString);

impl CourseCode {
    /// Creates a new `CourseCode` from a string.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidInput::CourseCode`] if the string is empty or contains
    /// whitespace or a delimiter character.
    pub fn new(s: impl Into<String>) -> Result<Self, InvalidInput> {
        let s = s.into();
        if s.chars().any(|c| c.is_whitespace() || DELIMITERS.contains(&c)) {
            return Err(InvalidInput::CourseCode(s));
        }
        NonEmptyString::new(s).map(Self).map_err(InvalidInput::CourseCode)
    }

    /// Returns the string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl AsRef<str> for CourseCode {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl Deref for CourseCode {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        self.as_str()
    }
}

impl fmt::Display for CourseCode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CourseCode {
    type Err = InvalidInput;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<&str> for CourseCode {
    type Error = InvalidInput;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl Serialize for CourseCode {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

/// A validated display name for a student or a course.
///
/// Names are trimmed, must not be empty, and must not contain `|` or line
/// breaks. Commas and colons are allowed since a name always occupies a
/// whole `|`-delimited field.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Name(NonEmptyString);

impl Name {
    /// Creates a new `Name`, trimming surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidInput::Name`] if the trimmed string is empty or
    /// contains `|`, `\n` or `\r`.
    pub fn new(s: impl AsRef<str>) -> Result<Self, InvalidInput> {
        let s = s.as_ref();
        let trimmed = s.trim();
        if trimmed.contains(['|', '\n', '\r']) {
            return Err(InvalidInput::Name(s.to_string()));
        }
        NonEmptyString::new(trimmed.to_string())
            .map(Self)
            .map_err(|_| InvalidInput::Name(s.to_string()))
    }

    /// Returns the string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Name {
    type Err = InvalidInput;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl Serialize for Name {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

/// A course grade on a 0 to 10 scale (both ends inclusive).
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct Grade(f32);

impl Grade {
    /// The lowest accepted grade.
    pub const MIN: f32 = 0.0;
    /// The highest accepted grade.
    pub const MAX: f32 = 10.0;

    /// Creates a new `Grade`.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidInput::GradeOutOfRange`] if the value is not within
    /// `[0, 10]`. `NaN` is always out of range.
    pub fn new(value: f32) -> Result<Self, InvalidInput> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Ok(Self(value))
        } else {
            Err(InvalidInput::GradeOutOfRange(value))
        }
    }

    /// Returns the grade as a float.
    #[must_use]
    pub const fn value(self) -> f32 {
        self.0
    }
}

/// Formats the grade in the shortest form that parses back to the same value.
impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Grade {
    type Err = InvalidInput;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s.trim().parse::<f32>().map_err(|_| InvalidInput::Number {
            field: "grade",
            value: s.to_string(),
        })?;
        Self::new(value)
    }
}

/// A value supplied for a record field was rejected.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InvalidInput {
    /// The course code is empty or contains whitespace or a delimiter.
    #[error("invalid course code '{0}': must be non-empty and contain no whitespace, '|', ',' or ':'")]
    CourseCode(String),

    /// The name is empty or contains `|` or a line break.
    #[error("invalid name '{0}': must be non-empty and contain no '|' or line breaks")]
    Name(String),

    /// The grade is outside `[0, 10]`.
    #[error("invalid grade {0}: must be between 0 and 10")]
    GradeOutOfRange(f32),

    /// A numeric field could not be parsed.
    #[error("invalid {field} '{value}': not a valid number")]
    Number {
        /// The field that was being parsed.
        field: &'static str,
        /// The rejected text.
        value: String,
    },

    /// The student field selected for an update is not recognised.
    #[error("unknown student field '{0}': expected 'name' or 'age'")]
    Field(String),
}

/// Parses a non-negative integer field, trimming surrounding whitespace.
///
/// # Errors
///
/// Returns [`InvalidInput::Number`] naming `field` if `value` is not a valid
/// `u32`.
pub fn parse_number(field: &'static str, value: &str) -> Result<u32, InvalidInput> {
    value.trim().parse().map_err(|_| InvalidInput::Number {
        field,
        value: value.to_string(),
    })
}

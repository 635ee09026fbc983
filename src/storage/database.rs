//! A flat-file backed store of students and courses.
//!
//! The [`Database`] holds both collections in memory, in insertion order.
//! Every mutation rewrites the affected file in full before returning. If
//! the write fails the in-memory change is undone, so memory and disk never
//! disagree.

use std::{
    collections::HashSet,
    fmt,
    fs::{self, File},
    hash::Hash,
    io::{self, BufRead, BufReader, BufWriter, Write},
    path::{Path, PathBuf},
};

use tracing::instrument;

use crate::{
    domain::{
        field::{CourseCode, Grade, InvalidInput, Name},
        Config, Course, Student, StudentUpdate,
    },
    storage::line::{LineRecord, ParseError},
};

/// Identifies a record in one of the two collections.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Key {
    /// A student, by roll number.
    Student(u32),
    /// A course, by code.
    Course(CourseCode),
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Student(roll_no) => write!(f, "student with roll number {roll_no}"),
            Self::Course(code) => write!(f, "course {code}"),
        }
    }
}

/// Errors reported by [`Database`] operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No record with the given key exists.
    #[error("{0} not found")]
    NotFound(Key),

    /// A record with the given key already exists.
    #[error("{0} already exists")]
    AlreadyExists(Key),

    /// The student is already enrolled in the course. Nothing was changed.
    #[error("student {roll_no} is already enrolled in {code}")]
    AlreadyEnrolled {
        /// The student's roll number.
        roll_no: u32,
        /// The course code.
        code: CourseCode,
    },

    /// A supplied value was rejected.
    #[error(transparent)]
    InvalidInput(#[from] InvalidInput),

    /// A stored line could not be parsed.
    #[error("invalid record at {}:{line}", .path.display())]
    InvalidRecord {
        /// The file containing the line.
        path: PathBuf,
        /// The 1-based line number.
        line: usize,
        /// Why the line was rejected.
        source: ParseError,
    },

    /// A backing file could not be read or written.
    #[error("failed to access {}", .path.display())]
    Io {
        /// The file being accessed.
        path: PathBuf,
        /// The underlying error.
        source: io::Error,
    },
}

/// A flat-file backed store of students and courses.
#[derive(Debug)]
pub struct Database {
    /// The directory the backing files live in.
    root: PathBuf,
    config: Config,
    students: Vec<Student>,
    courses: Vec<Course>,
}

impl Database {
    /// Opens the records stored under `root`.
    ///
    /// Settings are read from `roster.toml` in `root` if present. Missing
    /// record files are treated as empty collections.
    ///
    /// # Errors
    ///
    /// Returns an error if a record file exists but cannot be read, or
    /// contains a malformed line (unless `skip_malformed` is set).
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, Error> {
        let root = root.into();
        let config = load_config(&root);
        Self::open_with_config(root, config)
    }

    /// Opens the records stored under `root` using the given configuration.
    ///
    /// # Errors
    ///
    /// See [`Database::open`].
    #[instrument(level = "debug", skip(config))]
    pub fn open_with_config(root: PathBuf, config: Config) -> Result<Self, Error> {
        let students = load_records(
            &config.students_path(&root),
            config.skip_malformed,
            Student::roll_no,
        )?;
        let courses = load_records(&config.courses_path(&root), config.skip_malformed, |c: &Course| {
            c.code().clone()
        })?;

        tracing::info!(
            "Loaded {} students and {} courses from {}",
            students.len(),
            courses.len(),
            root.display()
        );

        Ok(Self {
            root,
            config,
            students,
            courses,
        })
    }

    /// The directory the backing files live in.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The active configuration.
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// All students, in insertion order.
    #[must_use]
    pub fn students(&self) -> &[Student] {
        &self.students
    }

    /// All courses, in insertion order.
    #[must_use]
    pub fn courses(&self) -> &[Course] {
        &self.courses
    }

    fn student_index(&self, roll_no: u32) -> Option<usize> {
        self.students.iter().position(|s| s.roll_no() == roll_no)
    }

    fn course_index(&self, code: &CourseCode) -> Option<usize> {
        self.courses.iter().position(|c| c.code() == code)
    }

    fn existing_student(&self, roll_no: u32) -> Result<usize, Error> {
        self.student_index(roll_no)
            .ok_or(Error::NotFound(Key::Student(roll_no)))
    }

    /// Saves the students file, applying `undo` to the in-memory collection
    /// if the write fails.
    fn save_students_or_undo(
        &mut self,
        undo: impl FnOnce(&mut Vec<Student>),
    ) -> Result<(), Error> {
        let result = self.save_students();
        if result.is_err() {
            undo(&mut self.students);
        }
        result
    }

    /// Saves the courses file, applying `undo` to the in-memory collection
    /// if the write fails.
    fn save_courses_or_undo(&mut self, undo: impl FnOnce(&mut Vec<Course>)) -> Result<(), Error> {
        let result = self.save_courses();
        if result.is_err() {
            undo(&mut self.courses);
        }
        result
    }

    /// Replaces the student at `index` with `student` and saves, restoring the
    /// previous record if the write fails.
    fn replace_student(&mut self, index: usize, student: Student) -> Result<(), Error> {
        let previous = std::mem::replace(&mut self.students[index], student);
        self.save_students_or_undo(move |students| students[index] = previous)
    }

    /// Returns a copy of the student with the given roll number.
    #[must_use]
    pub fn search_student(&self, roll_no: u32) -> Option<Student> {
        self.student_index(roll_no)
            .map(|index| self.students[index].clone())
    }

    /// Returns a copy of the course with the given code.
    #[must_use]
    pub fn search_course(&self, code: &CourseCode) -> Option<Course> {
        self.course_index(code).map(|index| self.courses[index].clone())
    }

    /// Adds a new student with no enrollments.
    ///
    /// A failed write leaves the collection unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AlreadyExists`] if the roll number is taken, or
    /// [`Error::Io`] if the students file cannot be written.
    #[instrument(skip(self))]
    pub fn add_student(&mut self, roll_no: u32, name: Name, age: u32) -> Result<Student, Error> {
        if self.student_index(roll_no).is_some() {
            return Err(Error::AlreadyExists(Key::Student(roll_no)));
        }

        let student = Student::new(roll_no, name, age);
        self.students.push(student.clone());
        self.save_students_or_undo(|students| {
            students.pop();
        })?;

        tracing::debug!("Added student {roll_no}");
        Ok(student)
    }

    /// Removes a student, returning the removed record.
    ///
    /// Enrollments and grades go with the student; nothing else refers to it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if there is no such student, or
    /// [`Error::Io`] if the students file cannot be written.
    #[instrument(skip(self))]
    pub fn delete_student(&mut self, roll_no: u32) -> Result<Student, Error> {
        let index = self.existing_student(roll_no)?;

        let student = self.students.remove(index);
        let restored = student.clone();
        self.save_students_or_undo(move |students| students.insert(index, restored))?;

        tracing::debug!("Deleted student {roll_no}");
        Ok(student)
    }

    /// Changes the name or age of a student, returning the updated record.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if there is no such student, or
    /// [`Error::Io`] if the students file cannot be written.
    #[instrument(skip(self))]
    pub fn update_student(&mut self, roll_no: u32, update: StudentUpdate) -> Result<Student, Error> {
        let index = self.existing_student(roll_no)?;

        let mut updated = self.students[index].clone();
        updated.apply(update);
        self.replace_student(index, updated.clone())?;

        Ok(updated)
    }

    /// Adds a new course.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AlreadyExists`] if the code is taken, or
    /// [`Error::Io`] if the courses file cannot be written.
    #[instrument(skip(self))]
    pub fn add_course(
        &mut self,
        code: CourseCode,
        name: Name,
        credits: u32,
    ) -> Result<Course, Error> {
        if self.course_index(&code).is_some() {
            return Err(Error::AlreadyExists(Key::Course(code)));
        }

        let course = Course::new(code, name, credits);
        self.courses.push(course.clone());
        self.save_courses_or_undo(|courses| {
            courses.pop();
        })?;

        tracing::debug!("Added course {}", course.code());
        Ok(course)
    }

    /// Removes a course, returning the removed record.
    ///
    /// Students enrolled in the course keep the code in their enrollment
    /// list and grade map.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if there is no such course, or
    /// [`Error::Io`] if the courses file cannot be written.
    #[instrument(skip(self))]
    pub fn delete_course(&mut self, code: &CourseCode) -> Result<Course, Error> {
        let index = self
            .course_index(code)
            .ok_or_else(|| Error::NotFound(Key::Course(code.clone())))?;

        let course = self.courses.remove(index);
        let restored = course.clone();
        self.save_courses_or_undo(move |courses| courses.insert(index, restored))?;

        tracing::debug!("Deleted course {code}");
        Ok(course)
    }

    /// Enrolls a student in a course.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if either the student or the course does
    /// not exist, [`Error::AlreadyEnrolled`] if the student is already
    /// enrolled (nothing is written in that case), or [`Error::Io`] if the
    /// students file cannot be written.
    #[instrument(skip(self))]
    pub fn enroll(&mut self, roll_no: u32, code: &CourseCode) -> Result<(), Error> {
        let index = self.existing_student(roll_no)?;
        if self.course_index(code).is_none() {
            return Err(Error::NotFound(Key::Course(code.clone())));
        }

        let mut enrolled = self.students[index].clone();
        if !enrolled.enroll(code.clone()) {
            return Err(Error::AlreadyEnrolled {
                roll_no,
                code: code.clone(),
            });
        }
        self.replace_student(index, enrolled)?;

        tracing::debug!("Enrolled student {roll_no} in {code}");
        Ok(())
    }

    /// Records a grade for a student, returning the grade it replaced.
    ///
    /// Neither the course nor an enrollment in it is required.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if there is no such student,
    /// [`Error::InvalidInput`] if the grade is outside `[0, 10]` (any prior
    /// grade is kept), or [`Error::Io`] if the students file cannot be
    /// written.
    #[instrument(skip(self))]
    pub fn add_grade(
        &mut self,
        roll_no: u32,
        code: CourseCode,
        grade: f32,
    ) -> Result<Option<Grade>, Error> {
        let index = self.existing_student(roll_no)?;
        let grade = Grade::new(grade)?;

        let mut graded = self.students[index].clone();
        let previous = graded.record_grade(code, grade);
        self.replace_student(index, graded)?;

        Ok(previous)
    }

    /// The grade point average of a student.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if there is no such student.
    pub fn gpa(&self, roll_no: u32) -> Result<f32, Error> {
        self.student_index(roll_no)
            .map(|index| self.students[index].gpa())
            .ok_or(Error::NotFound(Key::Student(roll_no)))
    }

    /// Rewrites the students file from memory.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the file cannot be written.
    pub fn save_students(&self) -> Result<(), Error> {
        let path = self.config.students_path(&self.root);
        write_records(&path, &self.students)
    }

    /// Rewrites the courses file from memory.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the file cannot be written.
    pub fn save_courses(&self) -> Result<(), Error> {
        let path = self.config.courses_path(&self.root);
        write_records(&path, &self.courses)
    }

    /// Rewrites both files from memory.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if either file cannot be written.
    pub fn flush(&self) -> Result<(), Error> {
        self.save_students()?;
        self.save_courses()
    }
}

fn load_config(root: &Path) -> Config {
    let path = root.join(Config::FILE_NAME);
    Config::load(&path).unwrap_or_else(|e| {
        tracing::debug!("Failed to load config: {e}");
        Config::default()
    })
}

fn load_records<T, K>(
    path: &Path,
    skip_malformed: bool,
    key: impl Fn(&T) -> K,
) -> Result<Vec<T>, Error>
where
    T: LineRecord,
    K: Eq + Hash + fmt::Debug,
{
    let io_error = |source| Error::Io {
        path: path.to_path_buf(),
        source,
    };

    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            tracing::debug!("No file at {}, starting empty", path.display());
            return Ok(Vec::new());
        }
        Err(e) => return Err(io_error(e)),
    };

    let mut records = Vec::new();
    let mut seen = HashSet::new();

    for (index, line) in BufReader::new(file).lines().enumerate() {
        let line = line.map_err(io_error)?;
        let line = line.trim_end_matches('\r');
        if line.trim().is_empty() {
            continue;
        }

        let record = match T::from_line(line) {
            Ok(record) => record,
            Err(source) if skip_malformed => {
                tracing::warn!(
                    "Skipping malformed line {} in {}: {source}",
                    index + 1,
                    path.display()
                );
                continue;
            }
            Err(source) => {
                return Err(Error::InvalidRecord {
                    path: path.to_path_buf(),
                    line: index + 1,
                    source,
                });
            }
        };

        let record_key = key(&record);
        if seen.contains(&record_key) {
            tracing::warn!(
                "Skipping duplicate record {record_key:?} at line {} in {}",
                index + 1,
                path.display()
            );
            continue;
        }
        seen.insert(record_key);
        records.push(record);
    }

    Ok(records)
}

/// Replaces the file at `path` with one line per record.
///
/// The lines are written to a sibling temporary file which is then renamed
/// over `path`, so an interrupted write leaves the previous contents intact.
fn write_records<T: LineRecord>(path: &Path, records: &[T]) -> Result<(), Error> {
    let io_error = |source| Error::Io {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(io_error)?;
    }

    let mut tmp_path = path.as_os_str().to_owned();
    tmp_path.push(".tmp");
    let tmp_path = PathBuf::from(tmp_path);

    let file = File::create(&tmp_path).map_err(io_error)?;
    let mut writer = BufWriter::new(file);
    for record in records {
        writeln!(writer, "{}", record.to_line()).map_err(io_error)?;
    }
    writer.flush().map_err(io_error)?;
    drop(writer);

    fs::rename(&tmp_path, path).map_err(io_error)?;

    tracing::debug!("Wrote {} records to {}", records.len(), path.display());
    Ok(())
}

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Configuration for a records directory.
///
/// Stored as `roster.toml` in the data root. Every setting is optional; a
/// missing file means the defaults below.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Versions", into = "Versions")]
pub struct Config {
    /// File name (relative to the data root) holding one student per line.
    students_file: String,

    /// File name (relative to the data root) holding one course per line.
    courses_file: String,

    /// Whether malformed lines are skipped (with a warning) when loading,
    /// instead of failing the load.
    pub skip_malformed: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            students_file: default_students_file(),
            courses_file: default_courses_file(),
            skip_malformed: false,
        }
    }
}

impl Config {
    /// The name of the configuration file inside the data root.
    pub const FILE_NAME: &'static str = "roster.toml";

    /// Loads the configuration from a TOML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or if the TOML content is
    /// invalid.
    pub fn load(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file: {e}"))?;
        toml::from_str(&content).map_err(|e| format!("Failed to parse config file: {e}"))
    }

    /// Saves the configuration to a TOML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be serialized to TOML or if
    /// the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<(), String> {
        let content =
            toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize config: {e}"))?;
        std::fs::write(path, content).map_err(|e| format!("Failed to write config file: {e}"))
    }

    /// Path of the students file under `root`.
    #[must_use]
    pub fn students_path(&self, root: &Path) -> PathBuf {
        root.join(&self.students_file)
    }

    /// Path of the courses file under `root`.
    #[must_use]
    pub fn courses_path(&self, root: &Path) -> PathBuf {
        root.join(&self.courses_file)
    }

    /// Sets the students file name.
    pub fn set_students_file(&mut self, file: impl Into<String>) {
        self.students_file = file.into();
    }

    /// Sets the courses file name.
    pub fn set_courses_file(&mut self, file: impl Into<String>) {
        self.courses_file = file.into();
    }
}

fn default_students_file() -> String {
    "students.txt".to_string()
}

fn default_courses_file() -> String {
    "courses.txt".to_string()
}

/// The serialized versions of the configuration.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "_version")]
enum Versions {
    #[serde(rename = "1")]
    V1 {
        #[serde(default = "default_students_file")]
        students_file: String,

        #[serde(default = "default_courses_file")]
        courses_file: String,

        #[serde(default)]
        skip_malformed: bool,
    },
}

impl From<Versions> for Config {
    fn from(versions: Versions) -> Self {
        match versions {
            Versions::V1 {
                students_file,
                courses_file,
                skip_malformed,
            } => Self {
                students_file,
                courses_file,
                skip_malformed,
            },
        }
    }
}

impl From<Config> for Versions {
    fn from(config: Config) -> Self {
        Self::V1 {
            students_file: config.students_file,
            courses_file: config.courses_file,
            skip_malformed: config.skip_malformed,
        }
    }
}

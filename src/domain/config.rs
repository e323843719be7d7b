use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Configuration for a catalog data directory.
///
/// File paths are interpreted relative to the data directory root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Versions", into = "Versions")]
pub struct Config {
    /// The course file.
    pub courses_file: PathBuf,

    /// The student file.
    pub students_file: PathBuf,

    /// The binary snapshot of the enrollment ledger.
    pub ledger_file: PathBuf,

    /// Where the plain-text enrollment report is written.
    pub report_file: PathBuf,

    /// The character separating course codes on a `PREREQUISITES` line.
    prerequisite_delimiter: char,

    /// Whether a repeated course code or student id in a source file is an
    /// error.
    ///
    /// When `false` (default) the first block wins and later blocks with the
    /// same key are skipped.
    pub reject_duplicates: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            courses_file: default_courses_file(),
            students_file: default_students_file(),
            ledger_file: default_ledger_file(),
            report_file: default_report_file(),
            prerequisite_delimiter: default_prerequisite_delimiter(),
            reject_duplicates: false,
        }
    }
}

impl Config {
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

    /// The character separating prerequisite codes.
    #[must_use]
    pub const fn prerequisite_delimiter(&self) -> char {
        self.prerequisite_delimiter
    }

    /// Sets the prerequisite delimiter.
    ///
    /// # Errors
    ///
    /// The key/value separator `:` and whitespace cannot be used.
    pub fn set_prerequisite_delimiter(&mut self, delimiter: char) -> Result<(), String> {
        if delimiter == ':' || delimiter.is_whitespace() {
            return Err(format!("'{delimiter}' cannot be used as a prerequisite delimiter"));
        }
        self.prerequisite_delimiter = delimiter;
        Ok(())
    }
}

fn default_courses_file() -> PathBuf {
    PathBuf::from("courses.txt")
}

fn default_students_file() -> PathBuf {
    PathBuf::from("students.txt")
}

fn default_ledger_file() -> PathBuf {
    PathBuf::from("enrollments.bin")
}

fn default_report_file() -> PathBuf {
    PathBuf::from("enrollment_report.txt")
}

const fn default_prerequisite_delimiter() -> char {
    ','
}

/// The serialized versions of the configuration.
/// This allows for future changes to the configuration format and to the domain
/// type without breaking compatibility.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "_version")]
enum Versions {
    #[serde(rename = "1")]
    V1 {
        #[serde(default = "default_courses_file")]
        courses_file: PathBuf,

        #[serde(default = "default_students_file")]
        students_file: PathBuf,

        #[serde(default = "default_ledger_file")]
        ledger_file: PathBuf,

        #[serde(default = "default_report_file")]
        report_file: PathBuf,

        #[serde(default = "default_prerequisite_delimiter")]
        prerequisite_delimiter: char,

        #[serde(default)]
        reject_duplicates: bool,
    },
}

impl TryFrom<Versions> for Config {
    type Error = String;

    fn try_from(versions: Versions) -> Result<Self, Self::Error> {
        match versions {
            Versions::V1 {
                courses_file,
                students_file,
                ledger_file,
                report_file,
                prerequisite_delimiter,
                reject_duplicates,
            } => {
                let mut config = Self {
                    courses_file,
                    students_file,
                    ledger_file,
                    report_file,
                    reject_duplicates,
                    ..Self::default()
                };
                config.set_prerequisite_delimiter(prerequisite_delimiter)?;
                Ok(config)
            }
        }
    }
}

impl From<Config> for Versions {
    fn from(config: Config) -> Self {
        Self::V1 {
            courses_file: config.courses_file,
            students_file: config.students_file,
            ledger_file: config.ledger_file,
            report_file: config.report_file,
            prerequisite_delimiter: config.prerequisite_delimiter,
            reject_duplicates: config.reject_duplicates,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use test_case::test_case;

    use super::*;

    #[test]
    fn load_reads_valid_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(
            b"_version = \"1\"\ncourses_file = \"data/courses.txt\"\nprerequisite_delimiter = \";\"\nreject_duplicates = true\n",
        )
        .unwrap();

        let config = Config::load(file.path()).unwrap();

        assert_eq!(config.courses_file, PathBuf::from("data/courses.txt"));
        assert_eq!(config.students_file, PathBuf::from("students.txt"));
        assert_eq!(config.prerequisite_delimiter(), ';');
        assert!(config.reject_duplicates);
    }

    #[test]
    fn load_missing_file_returns_error() {
        let tmp = tempfile::tempdir().unwrap();
        let missing = tmp.path().join("missing.toml");

        let error = Config::load(&missing).unwrap_err();
        assert!(error.starts_with("Failed to read config file:"));
    }

    #[test]
    fn load_invalid_toml_returns_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"_version = \"1\"\nreject_duplicates = \"sometimes\"\n")
            .unwrap();

        let error = Config::load(file.path()).unwrap_err();
        assert!(error.starts_with("Failed to parse config file:"));
    }

    #[test]
    fn empty_file_returns_default() {
        let expected = Config::default();
        let actual: Config = toml::from_str(r#"_version = "1""#).unwrap();
        assert_eq!(actual, expected);
    }

    #[test]
    fn save_and_reload() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("catalog.toml");

        let mut config = Config::default();
        config.set_prerequisite_delimiter('|').unwrap();
        config.reject_duplicates = true;
        config.save(&path).unwrap();

        assert_eq!(Config::load(&path).unwrap(), config);
    }

    #[test_case(":"; "key value separator")]
    #[test_case(" "; "space")]
    #[test_case("\\t"; "tab")]
    fn load_refuses_reserved_delimiter(delimiter: &str) {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "_version = \"1\"\nprerequisite_delimiter = \"{delimiter}\"\n").unwrap();

        let error = Config::load(file.path()).unwrap_err();
        assert!(error.starts_with("Failed to parse config file:"));
        assert!(error.contains("cannot be used as a prerequisite delimiter"));
    }

    #[test]
    fn colon_delimiter_is_refused() {
        let mut config = Config::default();
        assert!(config.set_prerequisite_delimiter(':').is_err());
        assert!(config.set_prerequisite_delimiter(' ').is_err());
        assert_eq!(config.prerequisite_delimiter(), ',');
    }
}

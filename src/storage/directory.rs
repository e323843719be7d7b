//! A filesystem backed catalog
//!
//! The [`Directory`] binds a data directory on disk to the filesystem
//! agnostic [`Catalog`] and [`Ledger`]. The directory holds a course file, a
//! student file, an optional ledger snapshot and an optional `catalog.toml`
//! naming them.

use std::path::{Path, PathBuf};

use crate::{
    domain::{Catalog, Config, CourseCode, Enrollment, EnrollmentError, Ledger, PersonId},
    storage::{
        CourseLoader, LoadError, StudentLoader,
        report::{self, ReportError},
        snapshot::{self, SnapshotError},
    },
};

/// Name of the configuration file in the directory root.
pub const CONFIG_FILE: &str = "catalog.toml";

/// A directory whose files have been loaded.
#[derive(Debug, Clone)]
pub struct Loaded {
    catalog: Catalog,
    ledger: Ledger,
    config: Config,
}

/// A directory that has not been read yet.
#[derive(Debug, PartialEq, Eq)]
pub struct Unloaded;

/// A filesystem backed catalog.
#[derive(Debug)]
pub struct Directory<S> {
    /// The root of the directory the catalog files are stored in.
    root: PathBuf,
    state: S,
}

impl<S> Directory<S> {
    /// The root of the directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        self.root.join(path)
    }
}

impl Directory<Unloaded> {
    /// Opens a directory at the given path.
    #[must_use]
    pub const fn new(root: PathBuf) -> Self {
        Self {
            root,
            state: Unloaded,
        }
    }

    /// Load the configuration, source files and ledger snapshot.
    ///
    /// A missing `catalog.toml` means default settings. A missing snapshot
    /// means an empty ledger.
    ///
    /// # Errors
    ///
    /// Returns an error naming the file that failed if either source file is
    /// missing or malformed, or the snapshot is unreadable.
    pub fn load_all(self) -> Result<Directory<Loaded>, DirectoryLoadError> {
        let config = load_config(&self.root);

        let courses_path = self.resolve(&config.courses_file);
        let courses = CourseLoader::from_config(&config)
            .load(&courses_path)
            .map_err(|source| DirectoryLoadError::Source {
                path: courses_path,
                source,
            })?;

        let students_path = self.resolve(&config.students_file);
        let students = StudentLoader::from_config(&config)
            .load(&students_path)
            .map_err(|source| DirectoryLoadError::Source {
                path: students_path,
                source,
            })?;

        let ledger_path = self.resolve(&config.ledger_file);
        let ledger = if ledger_path.exists() {
            let enrollments =
                snapshot::load(&ledger_path).map_err(|source| DirectoryLoadError::Ledger {
                    path: ledger_path,
                    source,
                })?;
            Ledger::from_enrollments(enrollments)
        } else {
            tracing::debug!("No ledger snapshot at {}", ledger_path.display());
            Ledger::new()
        };

        tracing::debug!(
            "Loaded {} courses, {} students and {} enrollments",
            courses.len(),
            students.len(),
            ledger.len()
        );

        Ok(Directory {
            root: self.root,
            state: Loaded {
                catalog: Catalog::new(courses, students),
                ledger,
                config,
            },
        })
    }
}

/// Errors that can occur when loading a directory.
#[derive(Debug, thiserror::Error)]
pub enum DirectoryLoadError {
    /// A course or student file could not be loaded.
    #[error("failed to load {}: {source}", .path.display())]
    Source {
        /// The file that failed.
        path: PathBuf,
        /// Why it failed.
        #[source]
        source: LoadError,
    },

    /// The ledger snapshot could not be loaded.
    #[error("failed to load {}: {source}", .path.display())]
    Ledger {
        /// The snapshot file.
        path: PathBuf,
        /// Why it failed.
        #[source]
        source: SnapshotError,
    },
}

/// Reads `catalog.toml` from `root`, falling back to defaults.
fn load_config(root: &Path) -> Config {
    let path = root.join(CONFIG_FILE);
    Config::load(&path).unwrap_or_else(|e| {
        tracing::debug!("Failed to load config: {e}");
        Config::default()
    })
}

impl Directory<Loaded> {
    /// The loaded courses and students.
    #[must_use]
    pub const fn catalog(&self) -> &Catalog {
        &self.state.catalog
    }

    /// The enrollment ledger.
    #[must_use]
    pub const fn ledger(&self) -> &Ledger {
        &self.state.ledger
    }

    /// The configuration in effect.
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.state.config
    }

    /// Enrolls a student in a course, looked up by key.
    ///
    /// The ledger is only changed in memory; call
    /// [`save_ledger`](Self::save_ledger) to persist it.
    ///
    /// # Errors
    ///
    /// Returns an error if the student or course is unknown, or if any
    /// enrollment rule rejects the request.
    pub fn enroll(
        &mut self,
        student: &PersonId,
        course: &CourseCode,
    ) -> Result<&Enrollment, EnrollError> {
        let Loaded {
            catalog, ledger, ..
        } = &mut self.state;

        let student = catalog
            .student(student)
            .ok_or_else(|| EnrollError::UnknownStudent(student.clone()))?;
        let course = catalog
            .course(course)
            .ok_or_else(|| EnrollError::UnknownCourse(course.clone()))?;

        Ok(ledger.enroll(student, course)?)
    }

    /// Writes the ledger snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot file cannot be written.
    pub fn save_ledger(&self) -> Result<PathBuf, SnapshotError> {
        let path = self.resolve(&self.state.config.ledger_file);
        snapshot::save(&path, self.state.ledger.enrollments())?;
        Ok(path)
    }

    /// Writes the enrollment report.
    ///
    /// # Errors
    ///
    /// Returns an error if the report file cannot be written.
    pub fn write_report(&self) -> Result<PathBuf, ReportError> {
        let path = self.resolve(&self.state.config.report_file);
        report::save(&path, self.state.ledger.enrollments())?;
        Ok(path)
    }
}

/// Errors that can occur when enrolling by key.
#[derive(Debug, thiserror::Error)]
pub enum EnrollError {
    /// No student has the given id.
    #[error("no student with id {0}")]
    UnknownStudent(PersonId),

    /// No course has the given code.
    #[error("no course with code {0}")]
    UnknownCourse(CourseCode),

    /// An enrollment rule rejected the request.
    #[error(transparent)]
    Rejected(#[from] EnrollmentError),
}

//! Plain-text enrollment reports.
//!
//! One line per enrollment, in ledger order:
//!
//! ```text
//! 1 | Dana Levi | Data Structures | 2024-10-01T09:15
//! ```

use std::{
    fs::File,
    io::{self, BufWriter, Write},
    path::{Path, PathBuf},
};

use tracing::instrument;

use crate::domain::Enrollment;

/// Format of the timestamp column.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M";

/// Errors that can occur when writing a report file.
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    /// The target exists and is not a regular file.
    #[error("cannot write enrollment report, {} is not a regular file", .0.display())]
    NotAFile(PathBuf),

    /// Writing failed.
    #[error("failed to write enrollment report to {}: {source}", .path.display())]
    Io {
        /// The report file.
        path: PathBuf,
        /// The underlying failure.
        #[source]
        source: io::Error,
    },
}

/// Renders one report line per enrollment to `writer`.
///
/// # Errors
///
/// Returns any error raised by the writer.
pub fn write<W: Write>(mut writer: W, enrollments: &[Enrollment]) -> io::Result<()> {
    for enrollment in enrollments {
        writeln!(
            writer,
            "{} | {} | {} | {}",
            enrollment.student().id(),
            enrollment.student().name(),
            enrollment.course().title(),
            enrollment.timestamp().format(TIMESTAMP_FORMAT)
        )?;
    }
    writer.flush()
}

/// Writes the report to `path`, replacing any existing file.
///
/// Missing parent directories are created.
///
/// # Errors
///
/// Returns [`ReportError::NotAFile`] if `path` names a directory or other
/// non-file, and [`ReportError::Io`] if the file cannot be written.
#[instrument(level = "debug", skip(enrollments), fields(enrollments = enrollments.len()))]
pub fn save(path: &Path, enrollments: &[Enrollment]) -> Result<(), ReportError> {
    if path.exists() && !path.is_file() {
        return Err(ReportError::NotAFile(path.to_path_buf()));
    }

    let io_error = |source| ReportError::Io {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(io_error)?;
    }
    let file = File::create(path).map_err(io_error)?;
    write(BufWriter::new(file), enrollments).map_err(io_error)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::NaiveDate;

    use super::*;
    use crate::domain::{Course, Ledger, Student};

    fn ledger() -> Ledger {
        let joined = NaiveDate::from_ymd_opt(2023, 9, 1).unwrap();
        let dana = Arc::new(Student::new("204518", "Dana Levi", joined).unwrap());
        let amir = Arc::new(Student::new("311207", "Amir Cohen", joined).unwrap());
        let course = Arc::new(Course::new("CS201", "Data Structures", 4, 25).unwrap());

        let first = NaiveDate::from_ymd_opt(2024, 10, 1)
            .unwrap()
            .and_hms_opt(9, 15, 59)
            .unwrap();
        let second = NaiveDate::from_ymd_opt(2024, 10, 2)
            .unwrap()
            .and_hms_opt(14, 3, 0)
            .unwrap();

        let mut ledger = Ledger::new();
        ledger.enroll_at(&dana, &course, first).unwrap();
        ledger.enroll_at(&amir, &course, second).unwrap();
        ledger
    }

    #[test]
    fn renders_one_line_per_enrollment() {
        let mut buffer = Vec::new();
        write(&mut buffer, ledger().enrollments()).unwrap();

        assert_eq!(
            String::from_utf8(buffer).unwrap(),
            "204518 | Dana Levi | Data Structures | 2024-10-01T09:15\n\
             311207 | Amir Cohen | Data Structures | 2024-10-02T14:03\n"
        );
    }

    #[test]
    fn empty_ledger_writes_empty_report() {
        let mut buffer = Vec::new();
        write(&mut buffer, &[]).unwrap();
        assert!(buffer.is_empty());
    }

    #[test]
    fn save_creates_parent_directories() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("output").join("enrollment_report.txt");

        save(&path, ledger().enrollments()).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 2);
    }

    #[test]
    fn save_replaces_existing_report() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("report.txt");
        std::fs::write(&path, "stale\nstale\nstale\n").unwrap();

        save(&path, &ledger().enrollments()[..1]).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("204518 | Dana Levi"));
        assert_eq!(content.lines().count(), 1);
    }

    #[test]
    fn save_to_directory_is_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        assert!(matches!(
            save(tmp.path(), ledger().enrollments()),
            Err(ReportError::NotAFile(_))
        ));
    }
}

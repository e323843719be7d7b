//! Reading and writing catalog data.
//!
//! Source files are block-structured `KEY:value` text. The ledger is stored
//! as a binary snapshot, and can be rendered as a plain-text report.

mod block;
pub use block::{FormatError, KEY_VALUE_DELIMITER, LoadError, RecordError};

mod course_file;
pub use course_file::{CourseLoader, ParsedCourse, resolve_prerequisites};

pub mod directory;
pub use directory::{Directory, DirectoryLoadError, EnrollError};

pub mod report;
pub use report::ReportError;

pub mod snapshot;
pub use snapshot::SnapshotError;

mod student_file;
pub use student_file::StudentLoader;

//! University course catalog
//!
//! Courses and students are read from plain-text block files. Enrollments are
//! checked against course capacity, duplicates and prerequisites, kept in an
//! append-only ledger, and persisted as a binary snapshot.

pub mod domain;
pub use domain::{
    Catalog, Config, Course, CourseCode, Enrollment, EnrollmentError, Ledger, PersonId, Student,
};

/// Filesystem storage for catalog data.
pub mod storage;
pub use storage::Directory;

//! Domain models for the course catalog.
//!
//! This module contains the entity types (students, lecturers, courses,
//! classrooms), their identity keys, the enrollment ledger and the
//! configuration.

mod catalog;
pub use catalog::Catalog;

pub mod collections;

mod config;
pub use config::Config;

mod course;
pub use course::{CapacityTooSmall, Course, CourseCode, CourseError, MINIMUM_CAPACITY};

mod enrollment;
pub use enrollment::Enrollment;

pub mod keyed;
pub use keyed::{Keyed, KeyedSet};

/// The enrollment ledger and its business rules.
pub mod ledger;
pub use ledger::{EnrollmentError, Ledger};

mod person;
pub use person::{Lecturer, Person, PersonId, Student};

pub mod schedule;
pub use schedule::{
    Classroom, ClassroomError, ClassroomTooSmall, MINIMUM_SEATS, RoomKey, ScheduledCourse,
    SemesterSchedule,
};

mod text;
pub use text::{Text, ValidationError};

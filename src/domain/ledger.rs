//! The enrollment ledger.
//!
//! The [`Ledger`] is an append-only record of which students enrolled in which
//! courses. It enforces the enrollment rules at insertion time; nothing is
//! appended unless every rule passes.

use std::sync::Arc;

use chrono::{Local, NaiveDateTime};
use thiserror::Error;
use tracing::instrument;

use crate::domain::{Course, CourseCode, Enrollment, PersonId, Student};

/// An ordered, append-only collection of enrollments.
#[derive(Debug, Clone, Default)]
pub struct Ledger {
    enrollments: Vec<Enrollment>,
}

/// Reasons an enrollment can be rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EnrollmentError {
    /// The course has as many enrollments as its capacity allows.
    #[error("course {course} is full ({capacity} students enrolled)")]
    CourseFull {
        /// The full course.
        course: CourseCode,
        /// The capacity of the course.
        capacity: u32,
    },

    /// The student is already enrolled in the course.
    #[error("student {student} is already enrolled in {course}")]
    DuplicateEnrollment {
        /// The student.
        student: PersonId,
        /// The course.
        course: CourseCode,
    },

    /// The student has not enrolled in one of the course's prerequisites.
    #[error("student {student} must enroll in {prerequisite} before enrolling in {course}")]
    PrerequisiteMissing {
        /// The student.
        student: PersonId,
        /// The course the student tried to enroll in.
        course: CourseCode,
        /// The first prerequisite the student has not enrolled in.
        prerequisite: CourseCode,
    },
}

impl Ledger {
    /// Creates an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restores a ledger from previously recorded enrollments.
    ///
    /// The enrollments are taken as-is, in order; the enrollment rules are not
    /// re-applied.
    #[must_use]
    pub const fn from_enrollments(enrollments: Vec<Enrollment>) -> Self {
        Self { enrollments }
    }

    /// Enrolls a student in a course, stamped with the current local time.
    ///
    /// # Errors
    ///
    /// See [`Ledger::enroll_at`].
    pub fn enroll(
        &mut self,
        student: &Arc<Student>,
        course: &Arc<Course>,
    ) -> Result<&Enrollment, EnrollmentError> {
        self.enroll_at(student, course, Local::now().naive_local())
    }

    /// Enrolls a student in a course at the given time.
    ///
    /// The rules are checked in a fixed order and the first violation is
    /// reported:
    ///
    /// 1. the course must not be full
    /// 2. the student must not already be enrolled in the course
    /// 3. the student must be enrolled in every prerequisite of the course,
    ///    checked in the course's prerequisite order
    ///
    /// # Errors
    ///
    /// Returns the [`EnrollmentError`] for the first rule that fails. The
    /// ledger is unchanged on error.
    #[instrument(
        level = "debug",
        skip_all,
        fields(student = %student.id(), course = %course.code())
    )]
    pub fn enroll_at(
        &mut self,
        student: &Arc<Student>,
        course: &Arc<Course>,
        timestamp: NaiveDateTime,
    ) -> Result<&Enrollment, EnrollmentError> {
        self.check(student.id(), course).inspect_err(|e| {
            tracing::debug!("Enrollment rejected: {e}");
        })?;

        self.enrollments.push(Enrollment::new(
            Arc::clone(student),
            Arc::clone(course),
            timestamp,
        ));
        tracing::info!("Enrolled {} in {}", student.id(), course.code());

        Ok(&self.enrollments[self.enrollments.len() - 1])
    }

    fn check(&self, student: &PersonId, course: &Course) -> Result<(), EnrollmentError> {
        let enrolled = self.enrollments_for_course(course.code()).count();
        if enrolled >= course.capacity() as usize {
            return Err(EnrollmentError::CourseFull {
                course: course.code().clone(),
                capacity: course.capacity(),
            });
        }

        if self.is_enrolled(student, course.code()) {
            return Err(EnrollmentError::DuplicateEnrollment {
                student: student.clone(),
                course: course.code().clone(),
            });
        }

        if let Some(prerequisite) = course
            .prerequisites()
            .iter()
            .find(|prerequisite| !self.is_enrolled(student, prerequisite))
        {
            return Err(EnrollmentError::PrerequisiteMissing {
                student: student.clone(),
                course: course.code().clone(),
                prerequisite: prerequisite.clone(),
            });
        }

        Ok(())
    }

    /// Returns `true` if the student is enrolled in the course.
    ///
    /// Only the identities of the student and course are compared.
    #[must_use]
    pub fn enrollment_exists(&self, student: &Student, course: &Course) -> bool {
        self.is_enrolled(student.id(), course.code())
    }

    /// Returns `true` if the student with this id is enrolled in the course
    /// with this code.
    #[must_use]
    pub fn is_enrolled(&self, student: &PersonId, course: &CourseCode) -> bool {
        self.enrollments
            .iter()
            .any(|enrollment| enrollment.pairs(student, course))
    }

    /// The enrollments in a course, in the order they were made.
    pub fn enrollments_for_course<'a>(
        &'a self,
        course: &'a CourseCode,
    ) -> impl Iterator<Item = &'a Enrollment> + 'a {
        self.enrollments
            .iter()
            .filter(move |enrollment| enrollment.course().code() == course)
    }

    /// The enrollments of a student, in the order they were made.
    pub fn enrollments_for_student<'a>(
        &'a self,
        student: &'a PersonId,
    ) -> impl Iterator<Item = &'a Enrollment> + 'a {
        self.enrollments
            .iter()
            .filter(move |enrollment| enrollment.student().id() == student)
    }

    /// All enrollments, in the order they were made.
    #[must_use]
    pub fn enrollments(&self) -> &[Enrollment] {
        &self.enrollments
    }

    /// The number of enrollments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.enrollments.len()
    }

    /// Returns `true` if nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.enrollments.is_empty()
    }
}

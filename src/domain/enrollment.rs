use std::sync::Arc;

use chrono::NaiveDateTime;

use crate::domain::{Course, CourseCode, PersonId, Student, keyed::Keyed};

/// A student's enrollment in a course.
///
/// An enrollment is identified by the (student, course) pair alone, so a
/// lookup can ask whether the pairing exists irrespective of when it was
/// made.
#[derive(Debug, Clone)]
pub struct Enrollment {
    student: Arc<Student>,
    course: Arc<Course>,
    timestamp: NaiveDateTime,
}

impl Enrollment {
    /// Records that `student` enrolled in `course` at `timestamp`.
    #[must_use]
    pub const fn new(student: Arc<Student>, course: Arc<Course>, timestamp: NaiveDateTime) -> Self {
        Self {
            student,
            course,
            timestamp,
        }
    }

    /// The enrolled student.
    #[must_use]
    pub const fn student(&self) -> &Arc<Student> {
        &self.student
    }

    /// The course enrolled in.
    #[must_use]
    pub const fn course(&self) -> &Arc<Course> {
        &self.course
    }

    /// When the enrollment was made.
    #[must_use]
    pub const fn timestamp(&self) -> NaiveDateTime {
        self.timestamp
    }

    /// Returns `true` if this enrollment pairs the given student and course.
    #[must_use]
    pub fn pairs(&self, student: &PersonId, course: &CourseCode) -> bool {
        self.student.id() == student && self.course.code() == course
    }
}

impl Keyed for Enrollment {
    type Key = (PersonId, CourseCode);

    fn key(&self) -> Self::Key {
        (self.student.key(), self.course.key())
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn student(id: &str) -> Arc<Student> {
        let joined = NaiveDate::from_ymd_opt(2023, 9, 1).unwrap();
        Arc::new(Student::new(id, "Dana", joined).unwrap())
    }

    fn course(code: &str) -> Arc<Course> {
        Arc::new(Course::new(code, "Intro", 3, 40).unwrap())
    }

    fn at(minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 2, 1)
            .unwrap()
            .and_hms_opt(10, minute, 0)
            .unwrap()
    }

    #[test]
    fn identity_ignores_timestamp() {
        let first = Enrollment::new(student("1"), course("CS101"), at(0));
        let later = Enrollment::new(student("1"), course("CS101"), at(30));
        assert_eq!(first.key(), later.key());
    }

    #[test]
    fn identity_depends_on_student_and_course() {
        let base = Enrollment::new(student("1"), course("CS101"), at(0));
        assert_ne!(
            base.key(),
            Enrollment::new(student("2"), course("CS101"), at(0)).key()
        );
        assert_ne!(
            base.key(),
            Enrollment::new(student("1"), course("CS102"), at(0)).key()
        );
    }

    #[test]
    fn pairs_matches_by_id_and_code() {
        let enrollment = Enrollment::new(student("1"), course("CS101"), at(0));
        let id = PersonId::new("1").unwrap();
        assert!(enrollment.pairs(&id, &CourseCode::new("CS101").unwrap()));
        assert!(!enrollment.pairs(&id, &CourseCode::new("CS102").unwrap()));
    }
}

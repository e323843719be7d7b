use std::{fmt, ops::Deref, str::FromStr};

use crate::domain::{
    KeyedSet,
    keyed::Keyed,
    text::{Text, ValidationError, positive},
};

/// The smallest capacity a course may be offered with.
pub const MINIMUM_CAPACITY: u32 = 10;

/// The unique code of a course, e.g. `CS101`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct CourseCode(Text);

impl CourseCode {
    /// Creates a course code, trimming surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns an error if the code is blank.
    pub fn new(code: impl AsRef<str>) -> Result<Self, ValidationError> {
        Text::new("course code", code).map(Self)
    }

    /// Returns the string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Deref for CourseCode {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        self.0.as_str()
    }
}

impl fmt::Display for CourseCode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for CourseCode {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl Keyed for CourseCode {
    type Key = Self;

    fn key(&self) -> Self {
        self.clone()
    }
}

/// A course offered by the university.
///
/// Prerequisites are held as course codes. Whoever builds the course is
/// responsible for making sure those codes refer to known courses (the course
/// file loader does this once the whole file has been read). Neither
/// self-references nor cycles are rejected.
#[derive(Debug, Clone)]
pub struct Course {
    code: CourseCode,
    title: Text,
    credit_points: u32,
    capacity: u32,
    prerequisites: KeyedSet<CourseCode>,
}

impl Course {
    /// Creates a course with no prerequisites.
    ///
    /// # Errors
    ///
    /// - [`CourseError::Validation`] if the code or title is blank, or the
    ///   credit points or capacity are not positive
    /// - [`CourseError::CapacityTooSmall`] if the capacity is positive but
    ///   below [`MINIMUM_CAPACITY`]
    pub fn new(
        code: impl AsRef<str>,
        title: impl AsRef<str>,
        credit_points: i64,
        capacity: i64,
    ) -> Result<Self, CourseError> {
        Ok(Self {
            code: CourseCode::new(code)?,
            title: Text::new("course title", title)?,
            credit_points: positive("credit points", credit_points)?,
            capacity: validate_capacity(capacity)?,
            prerequisites: KeyedSet::new(),
        })
    }

    /// Adds prerequisites, consuming and returning the course.
    #[must_use]
    pub fn with_prerequisites(mut self, codes: impl IntoIterator<Item = CourseCode>) -> Self {
        self.prerequisites.extend(codes);
        self
    }

    /// The course code.
    #[must_use]
    pub const fn code(&self) -> &CourseCode {
        &self.code
    }

    /// The course title.
    #[must_use]
    pub fn title(&self) -> &str {
        self.title.as_str()
    }

    /// The number of credit points awarded for the course.
    #[must_use]
    pub const fn credit_points(&self) -> u32 {
        self.credit_points
    }

    /// The maximum number of students that may enroll.
    #[must_use]
    pub const fn capacity(&self) -> u32 {
        self.capacity
    }

    /// The codes of the prerequisite courses, in the order they were added.
    #[must_use]
    pub fn prerequisites(&self) -> &[CourseCode] {
        self.prerequisites.as_slice()
    }

    /// Adds a prerequisite.
    ///
    /// Returns `false` if it was already present.
    pub fn add_prerequisite(&mut self, code: CourseCode) -> bool {
        self.prerequisites.insert(code)
    }

    /// Returns `true` if the course with this code is a prerequisite.
    #[must_use]
    pub fn has_prerequisite(&self, code: &CourseCode) -> bool {
        self.prerequisites.contains_key(code)
    }

    /// Replaces the code.
    ///
    /// # Errors
    ///
    /// Returns an error, leaving the course unchanged, if the code is blank.
    pub fn set_code(&mut self, code: impl AsRef<str>) -> Result<(), ValidationError> {
        self.code = CourseCode::new(code)?;
        Ok(())
    }

    /// Replaces the title.
    ///
    /// # Errors
    ///
    /// Returns an error, leaving the course unchanged, if the title is blank.
    pub fn set_title(&mut self, title: impl AsRef<str>) -> Result<(), ValidationError> {
        self.title = Text::new("course title", title)?;
        Ok(())
    }

    /// Replaces the credit points.
    ///
    /// # Errors
    ///
    /// Returns an error, leaving the course unchanged, if the value is not
    /// positive.
    pub fn set_credit_points(&mut self, credit_points: i64) -> Result<(), ValidationError> {
        self.credit_points = positive("credit points", credit_points)?;
        Ok(())
    }

    /// Replaces the capacity.
    ///
    /// # Errors
    ///
    /// Returns an error, leaving the course unchanged, if the capacity is not
    /// positive or is below [`MINIMUM_CAPACITY`].
    pub fn set_capacity(&mut self, capacity: i64) -> Result<(), CourseError> {
        self.capacity = validate_capacity(capacity)?;
        Ok(())
    }
}

fn validate_capacity(capacity: i64) -> Result<u32, CourseError> {
    let capacity = positive("course capacity", capacity)?;
    if capacity < MINIMUM_CAPACITY {
        return Err(CapacityTooSmall { capacity }.into());
    }
    Ok(capacity)
}

impl Keyed for Course {
    type Key = CourseCode;

    fn key(&self) -> CourseCode {
        self.code.clone()
    }
}

impl fmt::Display for Course {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} - {}", self.code, self.title)
    }
}

/// A course was given a capacity below [`MINIMUM_CAPACITY`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("course capacity must be at least {}, got {capacity}", MINIMUM_CAPACITY)]
pub struct CapacityTooSmall {
    /// The rejected capacity.
    pub capacity: u32,
}

/// Errors that can occur when constructing a [`Course`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CourseError {
    /// A field failed structural validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The capacity is below the minimum.
    #[error(transparent)]
    CapacityTooSmall(#[from] CapacityTooSmall),
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;

    fn code(s: &str) -> CourseCode {
        CourseCode::new(s).unwrap()
    }

    #[test]
    fn valid_course() {
        let course = Course::new(" CS101 ", " Intro to CS ", 4, 30).unwrap();
        assert_eq!(course.code().as_str(), "CS101");
        assert_eq!(course.title(), "Intro to CS");
        assert_eq!(course.credit_points(), 4);
        assert_eq!(course.capacity(), 30);
        assert!(course.prerequisites().is_empty());
        assert_eq!(course.to_string(), "CS101 - Intro to CS");
    }

    #[test]
    fn minimum_capacity_is_accepted() {
        let course = Course::new("CS101", "Intro", 3, i64::from(MINIMUM_CAPACITY)).unwrap();
        assert_eq!(course.capacity(), MINIMUM_CAPACITY);
    }

    #[test_case(1; "one")]
    #[test_case(9; "just below minimum")]
    fn small_capacity_is_a_distinct_error(capacity: i64) {
        let error = Course::new("CS101", "Intro", 3, capacity).unwrap_err();
        assert!(matches!(error, CourseError::CapacityTooSmall(_)));
    }

    #[test_case(0; "zero")]
    #[test_case(-10; "negative")]
    fn non_positive_capacity_is_a_validation_error(capacity: i64) {
        let error = Course::new("CS101", "Intro", 3, capacity).unwrap_err();
        assert!(matches!(
            error,
            CourseError::Validation(ValidationError::NotPositive { .. })
        ));
    }

    #[test]
    fn non_positive_credits_are_rejected() {
        let error = Course::new("CS101", "Intro", 0, 20).unwrap_err();
        assert_eq!(
            error,
            CourseError::Validation(ValidationError::NotPositive {
                field: "credit points",
                value: 0
            })
        );
    }

    #[test]
    fn blank_title_is_rejected() {
        let error = Course::new("CS101", "  ", 3, 20).unwrap_err();
        assert_eq!(
            error,
            CourseError::Validation(ValidationError::Blank {
                field: "course title"
            })
        );
    }

    #[test]
    fn prerequisites_are_deduplicated_in_order() {
        let mut course = Course::new("CS201", "Data Structures", 4, 20)
            .unwrap()
            .with_prerequisites([code("CS101"), code("MATH1"), code("CS101")]);

        assert!(!course.add_prerequisite(code("MATH1")));
        assert!(course.add_prerequisite(code("CS102")));
        assert_eq!(course.prerequisites(), [code("CS101"), code("MATH1"), code("CS102")]);
        assert!(course.has_prerequisite(&code("CS102")));
    }

    #[test]
    fn self_reference_is_permitted() {
        let mut course = Course::new("CS101", "Intro", 3, 20).unwrap();
        assert!(course.add_prerequisite(code("CS101")));
    }

    #[test]
    fn failed_capacity_update_keeps_previous_value() {
        let mut course = Course::new("CS101", "Intro", 3, 20).unwrap();
        assert!(course.set_capacity(5).is_err());
        assert_eq!(course.capacity(), 20);

        course.set_capacity(25).unwrap();
        assert_eq!(course.capacity(), 25);
    }

    #[test]
    fn capacity_error_message() {
        let error = Course::new("CS101", "Intro", 3, 4).unwrap_err();
        assert_eq!(error.to_string(), "course capacity must be at least 10, got 4");
    }
}

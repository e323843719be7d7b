use std::{fmt, ops::Deref, str::FromStr, sync::Arc};

use chrono::NaiveDate;

use crate::domain::{
    Course, CourseCode, KeyedSet,
    keyed::Keyed,
    text::{Text, ValidationError},
};

/// The unique identifier of a person (student or lecturer).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct PersonId(Text);

impl PersonId {
    /// Creates a person id, trimming surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns an error if the id is blank.
    pub fn new(id: impl AsRef<str>) -> Result<Self, ValidationError> {
        Text::new("person id", id).map(Self)
    }

    /// Returns the string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Deref for PersonId {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        self.0.as_str()
    }
}

impl fmt::Display for PersonId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for PersonId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

/// The fields shared by every kind of person.
///
/// Two people are the same person when their ids match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Person {
    id: PersonId,
    name: Text,
}

impl Person {
    /// Creates a person.
    ///
    /// # Errors
    ///
    /// Returns an error if the id or the name is blank.
    pub fn new(id: impl AsRef<str>, name: impl AsRef<str>) -> Result<Self, ValidationError> {
        Ok(Self {
            id: PersonId::new(id)?,
            name: Text::new("name", name)?,
        })
    }

    /// The person's id.
    #[must_use]
    pub const fn id(&self) -> &PersonId {
        &self.id
    }

    /// The person's name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Replaces the id.
    ///
    /// # Errors
    ///
    /// Returns an error, leaving the person unchanged, if the id is blank.
    pub fn set_id(&mut self, id: impl AsRef<str>) -> Result<(), ValidationError> {
        self.id = PersonId::new(id)?;
        Ok(())
    }

    /// Replaces the name.
    ///
    /// # Errors
    ///
    /// Returns an error, leaving the person unchanged, if the name is blank.
    pub fn set_name(&mut self, name: impl AsRef<str>) -> Result<(), ValidationError> {
        self.name = Text::new("name", name)?;
        Ok(())
    }
}

impl Keyed for Person {
    type Key = PersonId;

    fn key(&self) -> PersonId {
        self.id.clone()
    }
}

/// A student registered with the university.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Student {
    person: Person,
    enrollment_date: NaiveDate,
}

impl Student {
    /// Creates a student who joined on `enrollment_date`.
    ///
    /// # Errors
    ///
    /// Returns an error if the id or the name is blank.
    pub fn new(
        id: impl AsRef<str>,
        name: impl AsRef<str>,
        enrollment_date: NaiveDate,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            person: Person::new(id, name)?,
            enrollment_date,
        })
    }

    /// The student's id.
    #[must_use]
    pub const fn id(&self) -> &PersonId {
        self.person.id()
    }

    /// The student's name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.person.name()
    }

    /// The date the student joined the university.
    #[must_use]
    pub const fn enrollment_date(&self) -> NaiveDate {
        self.enrollment_date
    }

    /// The person-level fields of this student.
    #[must_use]
    pub const fn person(&self) -> &Person {
        &self.person
    }

    /// Mutable access to the person-level fields, whose setters validate.
    pub const fn person_mut(&mut self) -> &mut Person {
        &mut self.person
    }

    /// Replaces the enrollment date.
    pub const fn set_enrollment_date(&mut self, enrollment_date: NaiveDate) {
        self.enrollment_date = enrollment_date;
    }
}

impl Keyed for Student {
    type Key = PersonId;

    fn key(&self) -> PersonId {
        self.person.key()
    }
}

impl fmt::Display for Student {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} {} (joined {})",
            self.id(),
            self.name(),
            self.enrollment_date
        )
    }
}

/// A member of staff who teaches courses.
#[derive(Debug, Clone)]
pub struct Lecturer {
    person: Person,
    department: Text,
    teaches: KeyedSet<Arc<Course>>,
}

impl Lecturer {
    /// Creates a lecturer teaching the given courses.
    ///
    /// Courses are deduplicated by code.
    ///
    /// # Errors
    ///
    /// Returns an error if the id, name or department is blank.
    pub fn new(
        id: impl AsRef<str>,
        name: impl AsRef<str>,
        department: impl AsRef<str>,
        teaches: impl IntoIterator<Item = Arc<Course>>,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            person: Person::new(id, name)?,
            department: Text::new("department", department)?,
            teaches: teaches.into_iter().collect(),
        })
    }

    /// The lecturer's id.
    #[must_use]
    pub const fn id(&self) -> &PersonId {
        self.person.id()
    }

    /// The lecturer's name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.person.name()
    }

    /// The department the lecturer belongs to.
    #[must_use]
    pub fn department(&self) -> &str {
        self.department.as_str()
    }

    /// Replaces the department.
    ///
    /// # Errors
    ///
    /// Returns an error, leaving the lecturer unchanged, if the department is
    /// blank.
    pub fn set_department(&mut self, department: impl AsRef<str>) -> Result<(), ValidationError> {
        self.department = Text::new("department", department)?;
        Ok(())
    }

    /// The courses the lecturer teaches.
    #[must_use]
    pub fn courses(&self) -> &[Arc<Course>] {
        self.teaches.as_slice()
    }

    /// Adds a course to the lecturer's teaching load.
    ///
    /// Returns `false` if the lecturer already teaches a course with the same
    /// code.
    pub fn add_course(&mut self, course: Arc<Course>) -> bool {
        self.teaches.insert(course)
    }

    /// Returns `true` if the lecturer teaches the course with this code.
    #[must_use]
    pub fn is_teaching(&self, code: &CourseCode) -> bool {
        self.teaches.contains_key(code)
    }
}

impl Keyed for Lecturer {
    type Key = PersonId;

    fn key(&self) -> PersonId {
        self.person.key()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn joined() -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, 9, 1).unwrap()
    }

    fn course(code: &str) -> Arc<Course> {
        Arc::new(Course::new(code, "Some course", 3, 40).unwrap())
    }

    #[test]
    fn student_fields_are_trimmed() {
        let student = Student::new(" 123 ", "  Dana  ", joined()).unwrap();
        assert_eq!(student.id().as_str(), "123");
        assert_eq!(student.name(), "Dana");
        assert_eq!(student.enrollment_date(), joined());
    }

    #[test]
    fn blank_student_name_is_rejected() {
        assert_eq!(
            Student::new("1", " ", joined()).unwrap_err(),
            ValidationError::Blank { field: "name" }
        );
    }

    #[test]
    fn students_are_identified_by_id() {
        let a = Student::new("1", "Dana", joined()).unwrap();
        let b = Student::new("1", "Someone Else", NaiveDate::MIN).unwrap();
        assert_eq!(a.key(), b.key());
        assert_ne!(a, b);
    }

    #[test]
    fn failed_setter_leaves_person_unchanged() {
        let mut student = Student::new("1", "Dana", joined()).unwrap();
        assert!(student.person_mut().set_name("").is_err());
        assert_eq!(student.name(), "Dana");

        student.person_mut().set_name("Dana Cohen").unwrap();
        assert_eq!(student.name(), "Dana Cohen");
    }

    #[test]
    fn lecturer_courses_are_deduplicated() {
        let mut lecturer = Lecturer::new(
            "L1",
            "Prof. Amir",
            "Computer Science",
            [course("CS101"), course("CS102"), course("CS101")],
        )
        .unwrap();

        assert_eq!(lecturer.courses().len(), 2);
        assert!(!lecturer.add_course(course("CS102")));
        assert!(lecturer.add_course(course("CS201")));
        assert!(lecturer.is_teaching(&CourseCode::new("CS201").unwrap()));
        assert!(!lecturer.is_teaching(&CourseCode::new("MATH1").unwrap()));
    }

    #[test]
    fn lecturer_requires_department() {
        let error = Lecturer::new("L1", "Prof. Amir", "", []).unwrap_err();
        assert_eq!(error, ValidationError::Blank { field: "department" });
    }
}

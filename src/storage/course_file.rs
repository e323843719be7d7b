//! Loading courses from a `CODE`-delimited course file.
//!
//! ```text
//! CODE:CS201
//! TITLE:Data Structures
//! CREDITS:4
//! CAPACITY:40
//! PREREQUISITES:CS101,MATH1
//! ```
//!
//! Loading happens in two passes. The first builds every course with its raw
//! prerequisite codes; the second checks that each code names a course
//! defined somewhere in the same file, so forward references are allowed.

use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};

use tracing::instrument;

use crate::{
    domain::{Config, Course, CourseCode, Keyed, KeyedSet},
    storage::block::{
        self, Block, BlockParser, FieldError, FormatError, LoadError, ParseOptions, RecordError,
    },
};

const CODE: &str = "CODE";
const TITLE: &str = "TITLE";
const CREDITS: &str = "CREDITS";
const CAPACITY: &str = "CAPACITY";
const PREREQUISITES: &str = "PREREQUISITES";

/// A course as read from the file, before its prerequisites are checked.
#[derive(Debug, Clone)]
pub struct ParsedCourse {
    /// The validated course, without prerequisites.
    pub course: Course,

    /// The prerequisite codes listed for the course, in file order.
    pub prerequisites: Vec<CourseCode>,
}

impl Keyed for ParsedCourse {
    type Key = CourseCode;

    fn key(&self) -> CourseCode {
        self.course.code().clone()
    }
}

#[derive(Debug, Default)]
struct PendingCourse {
    code: Option<String>,
    title: Option<String>,
    credits: Option<i64>,
    capacity: Option<i64>,
    prerequisites: Vec<CourseCode>,
}

impl Block for PendingCourse {
    type Output = ParsedCourse;

    const ENTITY: &'static str = "course";
    const PRIMARY_KEY: &'static str = CODE;
    const KEYS: &'static [&'static str] = &[CODE, TITLE, CREDITS, CAPACITY, PREREQUISITES];

    fn primary(&self) -> Option<&str> {
        self.code.as_deref()
    }

    fn store(&mut self, key: &str, value: &str, options: ParseOptions) -> Result<(), FieldError> {
        match key {
            CODE => self.code = Some(block::text(value)?),
            TITLE => self.title = Some(block::text(value)?),
            CREDITS => self.credits = Some(block::integer(value)?),
            CAPACITY => self.capacity = Some(block::integer(value)?),
            PREREQUISITES => {
                self.prerequisites = block::code_list(value, options.list_delimiter)?;
            }
            _ => return Err(FieldError::UnknownKey),
        }
        Ok(())
    }

    // A zero is indistinguishable from an unset number.
    fn missing(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.title.is_none() {
            missing.push(TITLE);
        }
        if self.credits.unwrap_or(0) == 0 {
            missing.push(CREDITS);
        }
        if self.capacity.unwrap_or(0) == 0 {
            missing.push(CAPACITY);
        }
        missing
    }

    fn build(self) -> Result<ParsedCourse, RecordError> {
        let course = Course::new(
            self.code.unwrap_or_default(),
            self.title.unwrap_or_default(),
            self.credits.unwrap_or_default(),
            self.capacity.unwrap_or_default(),
        )?;
        Ok(ParsedCourse {
            course,
            prerequisites: self.prerequisites,
        })
    }
}

/// Reads course files.
#[derive(Debug, Clone, Copy, Default)]
pub struct CourseLoader {
    options: ParseOptions,
}

impl CourseLoader {
    /// A loader with default settings.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            options: ParseOptions::DEFAULT,
        }
    }

    /// A loader using the delimiter and duplicate policy from `config`.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self::new()
            .with_delimiter(config.prerequisite_delimiter())
            .reject_duplicates(config.reject_duplicates)
    }

    /// Sets the character separating prerequisite codes.
    #[must_use]
    pub const fn with_delimiter(mut self, delimiter: char) -> Self {
        self.options.list_delimiter = delimiter;
        self
    }

    /// Sets whether a repeated course code is an error.
    #[must_use]
    pub const fn reject_duplicates(mut self, reject: bool) -> Self {
        self.options.reject_duplicates = reject;
        self
    }

    /// Parses courses without resolving their prerequisites.
    ///
    /// # Errors
    ///
    /// Returns an error if reading fails or the content is malformed.
    pub fn parse_unresolved<R: BufRead>(&self, reader: R) -> Result<Vec<ParsedCourse>, LoadError> {
        BlockParser::<PendingCourse>::new(self.options).parse(reader)
    }

    /// Parses courses and attaches their prerequisites.
    ///
    /// # Errors
    ///
    /// Returns an error if reading fails, the content is malformed, or a
    /// prerequisite names a course not defined in the input.
    pub fn parse<R: BufRead>(&self, reader: R) -> Result<Vec<Course>, LoadError> {
        let parsed = self.parse_unresolved(reader)?;
        Ok(resolve_prerequisites(parsed)?)
    }

    /// Loads and resolves the course file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::Io`] if the file cannot be opened or read, and
    /// [`LoadError::Format`] if it is malformed.
    #[instrument(level = "debug", skip(self))]
    pub fn load(&self, path: &Path) -> Result<Vec<Course>, LoadError> {
        let file = File::open(path)?;
        self.parse(BufReader::new(file))
    }
}

/// Attaches prerequisites to parsed courses.
///
/// Every listed code must name one of the courses in `parsed`; order within
/// each course's list is kept. A course may list itself, and courses may
/// form cycles.
///
/// # Errors
///
/// Returns [`FormatError::DanglingPrerequisite`] for the first code that
/// names no parsed course.
#[instrument(level = "debug", skip_all, fields(courses = parsed.len()))]
pub fn resolve_prerequisites(parsed: Vec<ParsedCourse>) -> Result<Vec<Course>, FormatError> {
    let known: KeyedSet<CourseCode> = parsed.iter().map(|p| p.course.code().clone()).collect();

    parsed
        .into_iter()
        .map(|ParsedCourse { course, prerequisites }| {
            if let Some(prerequisite) = prerequisites.iter().find(|code| !known.contains_key(code)) {
                return Err(FormatError::DanglingPrerequisite {
                    course: course.code().clone(),
                    prerequisite: prerequisite.clone(),
                });
            }
            Ok(course.with_prerequisites(prerequisites))
        })
        .collect()
}

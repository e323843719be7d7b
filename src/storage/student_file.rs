//! Loading students from an `ID`-delimited student file.
//!
//! ```text
//! ID:204518
//! Name:Dana Levi
//! Joined:2023-09-01
//! ```

use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};

use chrono::NaiveDate;
use tracing::instrument;

use crate::{
    domain::{Config, Student},
    storage::block::{self, Block, BlockParser, FieldError, LoadError, ParseOptions, RecordError},
};

const ID: &str = "ID";
const NAME: &str = "Name";
const JOINED: &str = "Joined";

#[derive(Debug, Default)]
struct PendingStudent {
    id: Option<String>,
    name: Option<String>,
    joined: Option<NaiveDate>,
}

impl Block for PendingStudent {
    type Output = Student;

    const ENTITY: &'static str = "student";
    const PRIMARY_KEY: &'static str = ID;
    const KEYS: &'static [&'static str] = &[ID, NAME, JOINED];

    fn primary(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn store(&mut self, key: &str, value: &str, _: ParseOptions) -> Result<(), FieldError> {
        match key {
            ID => self.id = Some(block::text(value)?),
            NAME => self.name = Some(block::text(value)?),
            JOINED => self.joined = Some(block::date(value)?),
            _ => return Err(FieldError::UnknownKey),
        }
        Ok(())
    }

    fn missing(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.name.is_none() {
            missing.push(NAME);
        }
        if self.joined.is_none() {
            missing.push(JOINED);
        }
        missing
    }

    fn build(self) -> Result<Student, RecordError> {
        Ok(Student::new(
            self.id.unwrap_or_default(),
            self.name.unwrap_or_default(),
            self.joined.unwrap_or_default(),
        )?)
    }
}

/// Reads student files.
#[derive(Debug, Clone, Copy, Default)]
pub struct StudentLoader {
    options: ParseOptions,
}

impl StudentLoader {
    /// A loader with default settings.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            options: ParseOptions::DEFAULT,
        }
    }

    /// A loader using the duplicate policy from `config`.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self::new().reject_duplicates(config.reject_duplicates)
    }

    /// Sets whether a repeated student id is an error.
    #[must_use]
    pub const fn reject_duplicates(mut self, reject: bool) -> Self {
        self.options.reject_duplicates = reject;
        self
    }

    /// Parses students from any buffered reader.
    ///
    /// # Errors
    ///
    /// Returns an error if reading fails or the content is malformed.
    pub fn parse<R: BufRead>(&self, reader: R) -> Result<Vec<Student>, LoadError> {
        BlockParser::<PendingStudent>::new(self.options).parse(reader)
    }

    /// Loads the student file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::Io`] if the file cannot be opened or read, and
    /// [`LoadError::Format`] if it is malformed.
    #[instrument(level = "debug", skip(self))]
    pub fn load(&self, path: &Path) -> Result<Vec<Student>, LoadError> {
        let file = File::open(path)?;
        self.parse(BufReader::new(file))
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use test_case::test_case;

    use super::*;
    use crate::storage::block::FormatError;

    fn load(input: &str) -> Result<Vec<Student>, FormatError> {
        match StudentLoader::new().parse(Cursor::new(input)) {
            Ok(students) => Ok(students),
            Err(LoadError::Format(e)) => Err(e),
            Err(LoadError::Io(e)) => panic!("unexpected I/O error: {e}"),
        }
    }

    #[test]
    fn loads_students() {
        let input = "\
ID:1
Name:Dana Levi
Joined:2023-09-01

ID: 2
Name: Amir Cohen
Joined: 2024-02-29
";
        let students = load(input).unwrap();

        assert_eq!(students.len(), 2);
        assert_eq!(students[1].id().as_str(), "2");
        assert_eq!(students[1].name(), "Amir Cohen");
        assert_eq!(
            students[1].enrollment_date(),
            NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()
        );
    }

    #[test]
    fn fields_may_appear_in_any_order() {
        let students = load("ID:1\nJoined:2023-09-01\nName:Dana\n").unwrap();
        assert_eq!(students[0].name(), "Dana");
    }

    #[test_case("ID:1\nName:Dana\nJoined:01/09/2023\n"; "wrong date format")]
    #[test_case("ID:1\nName:Dana\nJoined:2023-13-01\n"; "month out of range")]
    #[test_case("ID:1\nName:   \nJoined:2023-09-01\n"; "blank name")]
    fn invalid_values(input: &str) {
        assert!(matches!(
            load(input).unwrap_err(),
            FormatError::InvalidValue { .. }
        ));
    }

    #[test]
    fn missing_join_date_at_end_of_file() {
        let error = load("ID:1\nName:Dana\n").unwrap_err();
        assert_eq!(
            error,
            FormatError::UnexpectedEof {
                entity: "student",
                start: 1,
                missing: vec![JOINED],
            }
        );
    }

    #[test]
    fn missing_name_before_next_block() {
        let error = load("ID:1\nJoined:2023-09-01\nID:2\nName:Amir\nJoined:2023-09-01\n").unwrap_err();
        assert_eq!(
            error.to_string(),
            "line 3: student block starting at line 1 is incomplete, missing Name"
        );
    }

    #[test]
    fn keys_are_case_sensitive() {
        assert!(matches!(
            load("ID:1\nNAME:Dana\n").unwrap_err(),
            FormatError::UnknownKey { line: 2, .. }
        ));
    }

    #[test]
    fn duplicate_id_keeps_first_block() {
        let input = "ID:1\nName:Dana\nJoined:2023-09-01\nID:1\nName:Yossi\nJoined:2024-01-01\n";
        let students = load(input).unwrap();
        assert_eq!(students.len(), 1);
        assert_eq!(students[0].name(), "Dana");
    }

    #[test]
    fn duplicate_id_can_be_rejected() {
        let input = "ID:1\nName:Dana\nJoined:2023-09-01\nID:1\nName:Yossi\nJoined:2024-01-01\n";
        let error = StudentLoader::new()
            .reject_duplicates(true)
            .parse(Cursor::new(input))
            .unwrap_err();
        assert!(matches!(
            error,
            LoadError::Format(FormatError::DuplicateRecord { line: 4, .. })
        ));
    }

    #[test]
    fn load_missing_file_is_an_io_error() {
        let tmp = tempfile::tempdir().unwrap();
        let error = StudentLoader::new()
            .load(&tmp.path().join("students.txt"))
            .unwrap_err();
        assert!(matches!(error, LoadError::Io(_)));
    }
}

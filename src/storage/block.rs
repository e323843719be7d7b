//! Line-oriented parsing of block-structured `KEY:value` files.
//!
//! A source file is a sequence of `KEY:value` lines. A recurring primary key
//! (e.g. `CODE` in a course file) marks the start of each block. Lines are
//! read one at a time into a pending record; the pending record is committed
//! to the output whenever the next primary key line is seen, and once more at
//! the end of the input.
//!
//! Loading is all-or-nothing: the first problem aborts the scan and nothing
//! parsed so far is returned.

use std::{
    io::{self, BufRead},
    str::FromStr,
};

use chrono::NaiveDate;
use tracing::instrument;

use crate::domain::{CapacityTooSmall, CourseCode, CourseError, Keyed, KeyedSet, ValidationError};

/// Separates the key from the value on every line.
pub const KEY_VALUE_DELIMITER: char = ':';

/// A pending record being assembled from the lines of one block.
pub(super) trait Block: Default {
    /// The record produced when the block is committed.
    type Output: Keyed;

    /// What the block describes, e.g. "course". Used in error messages.
    const ENTITY: &'static str;

    /// The key whose recurrence starts a new block.
    const PRIMARY_KEY: &'static str;

    /// Every key the block accepts, in the order they are listed to users.
    const KEYS: &'static [&'static str];

    /// The value of the primary key, if one has been read.
    fn primary(&self) -> Option<&str>;

    /// Parses and stores a value.
    ///
    /// A key that was already set is overwritten.
    fn store(&mut self, key: &str, value: &str, options: ParseOptions) -> Result<(), FieldError>;

    /// The mandatory fields that have not been set.
    fn missing(&self) -> Vec<&'static str>;

    /// Validates the fields and builds the record.
    fn build(self) -> Result<Self::Output, RecordError>;
}

/// Stripped from the start of the first line, if present.
const BYTE_ORDER_MARK: char = '\u{feff}';

/// Settings shared by all block loaders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) struct ParseOptions {
    pub(super) list_delimiter: char,
    pub(super) reject_duplicates: bool,
}

impl ParseOptions {
    /// Comma-separated lists, duplicates skipped.
    pub(super) const DEFAULT: Self = Self {
        list_delimiter: ',',
        reject_duplicates: false,
    };
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Why a single `KEY:value` line could not be stored.
#[derive(Debug)]
pub(super) enum FieldError {
    UnknownKey,
    Invalid(String),
}

/// A committed block described an entity that failed validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RecordError {
    /// A field failed structural validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The course capacity is below the minimum.
    #[error(transparent)]
    CapacityTooSmall(#[from] CapacityTooSmall),
}

impl From<CourseError> for RecordError {
    fn from(error: CourseError) -> Self {
        match error {
            CourseError::Validation(e) => Self::Validation(e),
            CourseError::CapacityTooSmall(e) => Self::CapacityTooSmall(e),
        }
    }
}

/// A source file is malformed.
///
/// Line numbers are 1-based.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormatError {
    /// A non-blank line has no key/value delimiter.
    #[error("line {line}: expected a 'KEY{}value' line", KEY_VALUE_DELIMITER)]
    MissingDelimiter {
        /// The offending line.
        line: usize,
    },

    /// A line starts with a key the file format does not define.
    #[error(
        "line {line}: unknown key '{key}', {entity} file lines must start with one of: {}",
        .expected.join(", ")
    )]
    UnknownKey {
        /// The kind of file being read.
        entity: &'static str,
        /// The offending line.
        line: usize,
        /// The unrecognised key.
        key: String,
        /// The keys the format accepts.
        expected: &'static [&'static str],
    },

    /// A value could not be parsed.
    #[error("line {line}: failed parsing {key}: {reason}")]
    InvalidValue {
        /// The offending line.
        line: usize,
        /// The key whose value is invalid.
        key: String,
        /// What was wrong with the value.
        reason: String,
    },

    /// A new block started before the previous one had all mandatory fields.
    #[error(
        "line {line}: {entity} block starting at line {start} is incomplete, missing {}",
        .missing.join(", ")
    )]
    IncompleteBlock {
        /// The kind of block.
        entity: &'static str,
        /// The line that started the next block.
        line: usize,
        /// The line the incomplete block started on.
        start: usize,
        /// The mandatory fields that were never set.
        missing: Vec<&'static str>,
    },

    /// The input ended before the last block had all mandatory fields.
    #[error(
        "unexpected end of file, {entity} block starting at line {start} is missing {}",
        .missing.join(", ")
    )]
    UnexpectedEof {
        /// The kind of block.
        entity: &'static str,
        /// The line the incomplete block started on.
        start: usize,
        /// The mandatory fields that were never set.
        missing: Vec<&'static str>,
    },

    /// A complete block describes an invalid entity.
    #[error("line {line}: invalid {entity}: {source}")]
    InvalidRecord {
        /// The kind of block.
        entity: &'static str,
        /// The line the block started on.
        line: usize,
        /// Why the entity is invalid.
        #[source]
        source: RecordError,
    },

    /// A block repeats the primary key of an earlier block.
    ///
    /// Only reported when duplicates are configured to be rejected.
    #[error("line {line}: duplicate {entity} '{key}'")]
    DuplicateRecord {
        /// The kind of block.
        entity: &'static str,
        /// The line the repeated block started on.
        line: usize,
        /// The repeated primary key value.
        key: String,
    },

    /// A course lists a prerequisite that is not defined anywhere in the
    /// file.
    #[error("course {course} lists prerequisite {prerequisite}, which is not among the loaded courses")]
    DanglingPrerequisite {
        /// The course listing the prerequisite.
        course: CourseCode,
        /// The unknown prerequisite code.
        prerequisite: CourseCode,
    },
}

/// Errors that can occur when loading a source file.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// The file could not be read.
    #[error(transparent)]
    Io(#[from] io::Error),

    /// The file is malformed.
    #[error(transparent)]
    Format(#[from] FormatError),
}

/// Where a commit was triggered.
#[derive(Debug, Clone, Copy)]
enum Boundary {
    /// A new primary key on the given line.
    NextBlock(usize),
    EndOfInput,
}

/// The streaming state machine that turns lines into records.
pub(super) struct BlockParser<B: Block> {
    options: ParseOptions,
    pending: B,
    /// Line the pending block started on.
    start: usize,
    records: KeyedSet<B::Output>,
}

impl<B: Block> BlockParser<B> {
    pub(super) fn new(options: ParseOptions) -> Self {
        Self {
            options,
            pending: B::default(),
            start: 0,
            records: KeyedSet::new(),
        }
    }

    /// Reads every line of `reader` and returns the committed records in
    /// file order.
    #[instrument(level = "debug", skip_all, fields(entity = B::ENTITY))]
    pub(super) fn parse<R: BufRead>(mut self, reader: R) -> Result<Vec<B::Output>, LoadError> {
        for (index, line) in reader.lines().enumerate() {
            let line = line?;
            let text = if index == 0 {
                line.strip_prefix(BYTE_ORDER_MARK).unwrap_or(&line)
            } else {
                &line
            };
            self.feed(index + 1, text)?;
        }
        self.commit(Boundary::EndOfInput)?;

        tracing::debug!("Parsed {} {} records", self.records.len(), B::ENTITY);
        Ok(self.records.into_vec())
    }

    fn feed(&mut self, number: usize, line: &str) -> Result<(), FormatError> {
        if line.trim().is_empty() {
            return Ok(());
        }

        let (key, value) = split_line(line).ok_or(FormatError::MissingDelimiter { line: number })?;

        if key == B::PRIMARY_KEY {
            self.commit(Boundary::NextBlock(number))?;
            self.start = number;
        }

        self.pending
            .store(key, value, self.options)
            .map_err(|error| match error {
                FieldError::UnknownKey => FormatError::UnknownKey {
                    entity: B::ENTITY,
                    line: number,
                    key: key.to_string(),
                    expected: B::KEYS,
                },
                FieldError::Invalid(reason) => FormatError::InvalidValue {
                    line: number,
                    key: key.to_string(),
                    reason,
                },
            })
    }

    /// Moves the pending block into the output, if one has been started.
    fn commit(&mut self, boundary: Boundary) -> Result<(), FormatError> {
        let Some(primary) = self.pending.primary() else {
            return Ok(());
        };
        let primary = primary.to_string();

        let missing = self.pending.missing();
        if !missing.is_empty() {
            return Err(match boundary {
                Boundary::NextBlock(line) => FormatError::IncompleteBlock {
                    entity: B::ENTITY,
                    line,
                    start: self.start,
                    missing,
                },
                Boundary::EndOfInput => FormatError::UnexpectedEof {
                    entity: B::ENTITY,
                    start: self.start,
                    missing,
                },
            });
        }

        let record = std::mem::take(&mut self.pending)
            .build()
            .map_err(|source| FormatError::InvalidRecord {
                entity: B::ENTITY,
                line: self.start,
                source,
            })?;

        if self.records.insert(record) {
            tracing::trace!("Committed {} '{primary}' from line {}", B::ENTITY, self.start);
        } else if self.options.reject_duplicates {
            return Err(FormatError::DuplicateRecord {
                entity: B::ENTITY,
                line: self.start,
                key: primary,
            });
        } else {
            tracing::debug!(
                "Skipping duplicate {} '{primary}' at line {}",
                B::ENTITY,
                self.start
            );
        }

        Ok(())
    }
}

/// Splits a line on the first delimiter into a trimmed key and a raw value.
fn split_line(line: &str) -> Option<(&str, &str)> {
    line.split_once(KEY_VALUE_DELIMITER)
        .map(|(key, value)| (key.trim(), value))
}

/// Parses a non-blank text value, trimming it.
pub(super) fn text(value: &str) -> Result<String, FieldError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(FieldError::Invalid("expected a value".to_string()));
    }
    Ok(value.to_string())
}

/// Parses an integer value.
pub(super) fn integer(value: &str) -> Result<i64, FieldError> {
    parse_as(value, "an integer")
}

/// Parses an ISO-8601 calendar date (`YYYY-MM-DD`).
pub(super) fn date(value: &str) -> Result<NaiveDate, FieldError> {
    parse_as(value, "an ISO-8601 date (YYYY-MM-DD)")
}

fn parse_as<T: FromStr>(value: &str, expected: &str) -> Result<T, FieldError> {
    let value = text(value)?;
    value
        .parse()
        .map_err(|_| FieldError::Invalid(format!("expected {expected}, got '{value}'")))
}

/// Parses a delimited list of course codes.
///
/// Items are trimmed; repeated items are dropped, keeping the first
/// occurrence.
pub(super) fn code_list(value: &str, delimiter: char) -> Result<Vec<CourseCode>, FieldError> {
    let value = text(value)?;
    let mut codes: KeyedSet<CourseCode> = KeyedSet::new();
    for item in value.split(delimiter) {
        let code = CourseCode::new(item).map_err(|_| {
            FieldError::Invalid(format!("empty entry in '{delimiter}'-separated list"))
        })?;
        codes.insert(code);
    }
    Ok(codes.into_vec())
}

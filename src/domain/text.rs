use std::{fmt, ops::Deref};

use non_empty_string::NonEmptyString;

/// A string that is guaranteed to be non-blank and free of surrounding
/// whitespace.
///
/// Every textual field of the catalog (ids, names, codes, titles, buildings)
/// is stored as a `Text`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Text(NonEmptyString);

impl Text {
    /// Trims `value` and wraps it.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::Blank`] naming `field` if nothing is left
    /// after trimming.
    pub fn new(field: &'static str, value: impl AsRef<str>) -> Result<Self, ValidationError> {
        NonEmptyString::new(value.as_ref().trim().to_string())
            .map(Self)
            .map_err(|_| ValidationError::Blank { field })
    }

    /// Returns the string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Deref for Text {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        self.0.as_str()
    }
}

impl AsRef<str> for Text {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for Text {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A field failed a structural constraint at construction time.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// The field was empty or contained only whitespace.
    #[error("{field} cannot be empty")]
    Blank {
        /// Name of the offending field.
        field: &'static str,
    },

    /// The field must be a positive integer.
    #[error("{field} must be a positive integer, got {value}")]
    NotPositive {
        /// Name of the offending field.
        field: &'static str,
        /// The rejected value.
        value: i64,
    },

    /// The field exceeds the largest representable value.
    #[error("{field} is too large: {value}")]
    TooLarge {
        /// Name of the offending field.
        field: &'static str,
        /// The rejected value.
        value: i64,
    },
}

/// Checks that `value` is a positive integer that fits in a `u32`.
pub(crate) fn positive(field: &'static str, value: i64) -> Result<u32, ValidationError> {
    if value <= 0 {
        return Err(ValidationError::NotPositive { field, value });
    }
    u32::try_from(value).map_err(|_| ValidationError::TooLarge { field, value })
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;

    #[test]
    fn trims_surrounding_whitespace() {
        let text = Text::new("name", "  Dana Levi \t").unwrap();
        assert_eq!(text.as_str(), "Dana Levi");
    }

    #[test_case(""; "empty")]
    #[test_case("   "; "spaces")]
    #[test_case("\t\n"; "control whitespace")]
    fn blank_is_rejected(input: &str) {
        assert_eq!(
            Text::new("title", input),
            Err(ValidationError::Blank { field: "title" })
        );
    }

    #[test_case(0; "zero")]
    #[test_case(-3; "negative")]
    fn non_positive_is_rejected(value: i64) {
        assert_eq!(
            positive("credits", value),
            Err(ValidationError::NotPositive {
                field: "credits",
                value
            })
        );
    }

    #[test]
    fn oversized_is_rejected() {
        let value = i64::from(u32::MAX) + 1;
        assert!(matches!(
            positive("seats", value),
            Err(ValidationError::TooLarge { .. })
        ));
    }

    #[test]
    fn error_message_names_field() {
        let error = Text::new("building", " ").unwrap_err();
        assert_eq!(error.to_string(), "building cannot be empty");
    }
}

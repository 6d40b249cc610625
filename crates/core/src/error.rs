//! Error type for document traversal and protocol reads.
//!
//! Every error here is a structural mismatch between the document and the
//! shape the read protocol expects. None of them are retryable: the parse
//! that produced one must be abandoned.

use serde::Serialize;
use std::fmt;

/// Errors raised by the document cursor, shape queries and readers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum DocError {
    /// `exit_subtree` was called with an empty zoom stack.
    StackUnderflow,
    /// `enter_subtree` could not find the requested field.
    MissingSubtree { field: String },
    /// A scalar, string or array read referenced a key the document
    /// does not contain.
    MissingEntry { key: String },
    /// A value was present but had the wrong JSON type.
    TypeMismatch {
        key: String,
        expected: &'static str,
    },
    /// An array read where source and destination lengths disagree.
    LengthMismatch {
        key: String,
        expected: usize,
        actual: usize,
    },
    /// A record enumeration query ran against an empty array.
    EmptyRecordArray,
    /// A record array element that is not a single-key object.
    MalformedRecord { position: usize },
    /// A reversed-order subtree entry whose countdown index does not
    /// address a valid group element.
    GroupIndexOutOfRange {
        field: String,
        index: usize,
        len: usize,
    },
    /// Diagnostic lookup of a key that was never declared at the top
    /// level of the document.
    UnknownVariable { name: String },
}

impl fmt::Display for DocError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocError::StackUnderflow => {
                write!(f, "exit_subtree called with an empty zoom stack")
            }
            DocError::MissingSubtree { field } => {
                write!(f, "document has no subtree named '{}'", field)
            }
            DocError::MissingEntry { key } => {
                write!(f, "provided data is missing the '{}' entry", key)
            }
            DocError::TypeMismatch { key, expected } => {
                write!(f, "entry '{}' is not {}", key, expected)
            }
            DocError::LengthMismatch {
                key,
                expected,
                actual,
            } => {
                write!(
                    f,
                    "entry '{}' has {} elements, expected {}",
                    key, actual, expected
                )
            }
            DocError::EmptyRecordArray => {
                write!(f, "record enumeration over an empty array")
            }
            DocError::MalformedRecord { position } => {
                write!(
                    f,
                    "record at position {} is not a single-key object",
                    position
                )
            }
            DocError::GroupIndexOutOfRange { field, index, len } => {
                write!(
                    f,
                    "group countdown for '{}' addresses element {} of {}",
                    field, index, len
                )
            }
            DocError::UnknownVariable { name } => {
                write!(f, "variable '{}' was not declared in the document", name)
            }
        }
    }
}

impl std::error::Error for DocError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_entry_display_names_the_key() {
        let err = DocError::MissingEntry {
            key: "num_conc".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "provided data is missing the 'num_conc' entry"
        );
    }

    #[test]
    fn length_mismatch_display() {
        let err = DocError::LengthMismatch {
            key: "rate".to_string(),
            expected: 3,
            actual: 2,
        };
        assert_eq!(err.to_string(), "entry 'rate' has 2 elements, expected 3");
    }
}

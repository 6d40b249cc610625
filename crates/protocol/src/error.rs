//! Error and warning types for one protocol session.

use serde::Serialize;
use std::fmt;

use specbridge_core::DocError;
use specbridge_tracker::TrackerError;

/// Errors that abort a parse.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseError {
    /// The document does not match the shape the protocol expects.
    Doc(DocError),
    /// Usage validation failed at teardown.
    Tracker(TrackerError),
    /// A protocol call was issued out of the documented order.
    OutOfOrder { call: &'static str },
    /// The consuming engine reported its own failure.
    Consumer(String),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::Doc(e) => write!(f, "{}", e),
            ParseError::Tracker(e) => write!(f, "{}", e),
            ParseError::OutOfOrder { call } => {
                write!(f, "protocol call '{}' issued out of order", call)
            }
            ParseError::Consumer(msg) => write!(f, "engine error: {}", msg),
        }
    }
}

impl std::error::Error for ParseError {}

impl From<DocError> for ParseError {
    fn from(e: DocError) -> Self {
        ParseError::Doc(e)
    }
}

impl From<TrackerError> for ParseError {
    fn from(e: TrackerError) -> Self {
        ParseError::Tracker(e)
    }
}

/// Recoverable conditions reported alongside a successful parse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Warning {
    /// A string read exceeded the caller's length bound and was clamped.
    Truncated {
        key: String,
        len: usize,
        max_len: usize,
    },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::Truncated { key, len, max_len } => {
                write!(
                    f,
                    "provided entry '{}' has too many characters ({} > {})",
                    key, len, max_len
                )
            }
        }
    }
}

//! specbridge-core: emulation core for the legacy spec-file read protocol.
//!
//! A legacy numerical engine consumes configuration through a sequential,
//! line-oriented protocol: read one named scalar, one named string, one
//! named array with a time axis, one row of a named table, or the next
//! line of an enumerated record stream. This crate backs that protocol
//! with a modern hierarchical document instead of a file, exposing a
//! stateful cursor over the borrowed document tree.
//!
//! # Public API
//!
//! Key types are re-exported at the crate root for convenience:
//!
//! - [`DocCursor`] -- zoom position, ancestor stack, typed reads
//! - [`RecordStream`] / [`StreamConfig`] -- the line-protocol state machine
//! - [`Line`] -- one `read_line` answer
//! - [`DocError`] -- structural error type
//!
//! Shape queries ([`shape::sibling_field_count`],
//! [`shape::numeric_record_count`]) answer the size questions the
//! protocol asks before each data read.

pub mod cursor;
pub mod error;
pub mod read;
pub mod shape;
pub mod stream;

pub use cursor::DocCursor;
pub use error::DocError;
pub use read::{FromDocValue, StringRead};
pub use stream::{unique_record_keys, Line, RecordStream, StreamConfig};

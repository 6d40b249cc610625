//! specbridge-protocol: the fixed call contract the legacy engine issues.
//!
//! The engine consumes configuration through a narrow vocabulary --
//! open/close scope, read real/integer/logical/string, read timed array,
//! read named table, read next line -- issued against one
//! [`ParseContext`] per parse. [`run_parse`] is the scoped entry point:
//! it builds the context, hands it to the consumer, and validates input
//! usage at teardown on every successful run.

pub mod context;
pub mod error;

pub use context::{run_parse, ParseContext, ParseOptions, ParseOutcome};
pub use error::{ParseError, Warning};

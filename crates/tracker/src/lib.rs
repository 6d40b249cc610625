//! specbridge-tracker: input usage bookkeeping for one document parse.
//!
//! The boundary protocol reports every read, scope and line into a
//! [`UsageTracker`]. At teardown, [`UsageTracker::check_all_used`] fails
//! the parse if any declared top-level key was never consumed, so stale
//! configuration is an error rather than silently ignored.

pub mod error;
pub mod ledger;
pub mod traits;

pub use error::TrackerError;
pub use ledger::InputLedger;
pub use traits::UsageTracker;

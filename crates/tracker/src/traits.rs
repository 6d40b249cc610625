use crate::error::TrackerError;

/// Bookkeeping contract the boundary protocol reports into.
///
/// The emulator core never implements this; it only reports events. The
/// tracker decides at teardown whether the parse consumed everything it
/// declared. Trackers never fail mid-parse: violations are recorded and
/// surfaced once by [`check_all_used`].
///
/// [`check_all_used`]: UsageTracker::check_all_used
pub trait UsageTracker {
    /// A key was successfully read through a scalar, string, array or
    /// table call.
    fn mark_used(&mut self, key: &str);

    /// A named scope was opened (the protocol descended into a subtree).
    fn open_scope(&mut self, label: &str);

    /// The innermost scope was closed.
    fn close_scope(&mut self);

    /// The record stream scanned a dictionary key; remembered so line
    /// names can be correlated with the document.
    fn set_current_key(&mut self, key: &str);

    /// A line was emitted under `name`; checked against the current
    /// dictionary key.
    fn check_line(&mut self, name: &str);

    /// Teardown validation: every declared top-level key must have been
    /// consumed, scopes must balance, and every emitted line must have
    /// had a backing key.
    fn check_all_used(&self) -> Result<(), TrackerError>;
}

/// All errors a usage tracker can report at scope teardown.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TrackerError {
    /// Top-level keys that were declared in the document but never read
    /// through any protocol call. Reported together, not first-fail, so
    /// one parse surfaces every stale key at once.
    #[error("unused input parameters: {}", .keys.join(", "))]
    UnusedInputs { keys: Vec<String> },

    /// More scopes were closed than opened, or scopes were left open at
    /// teardown.
    #[error("scope open/close calls are unbalanced")]
    UnbalancedScope,

    /// A line was emitted with no document key backing it.
    #[error("line '{name}' was emitted without a backing document key")]
    LineWithoutKey { name: String },
}

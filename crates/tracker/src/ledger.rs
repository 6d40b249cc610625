//! In-memory usage ledger over one document parse.

use std::collections::BTreeSet;

use serde_json::Value;

use crate::error::TrackerError;
use crate::traits::UsageTracker;

/// Tracks which top-level keys of a document were consumed during one
/// parse. Violations are recorded as they happen and reported together
/// at teardown.
pub struct InputLedger {
    declared: BTreeSet<String>,
    used: BTreeSet<String>,
    scopes: Vec<String>,
    current_key: String,
    underflowed: bool,
    orphan_lines: Vec<String>,
}

impl InputLedger {
    /// Register every top-level key of the document as declared.
    pub fn new(doc: &Value) -> Self {
        let declared = match doc {
            Value::Object(map) => map.keys().cloned().collect(),
            _ => BTreeSet::new(),
        };
        InputLedger {
            declared,
            used: BTreeSet::new(),
            scopes: Vec::new(),
            current_key: String::new(),
            underflowed: false,
            orphan_lines: Vec::new(),
        }
    }
}

impl UsageTracker for InputLedger {
    fn mark_used(&mut self, key: &str) {
        // Only reads at the top level consume declared keys; reads inside
        // a scope consume that scope's content, already accounted for by
        // the open.
        if self.scopes.is_empty() {
            self.used.insert(key.to_string());
        }
    }

    fn open_scope(&mut self, label: &str) {
        if self.scopes.is_empty() {
            self.used.insert(label.to_string());
        }
        self.scopes.push(label.to_string());
    }

    fn close_scope(&mut self) {
        if self.scopes.pop().is_none() {
            self.underflowed = true;
        }
    }

    fn set_current_key(&mut self, key: &str) {
        self.current_key = key.to_string();
    }

    fn check_line(&mut self, name: &str) {
        if !name.is_empty() && self.current_key.is_empty() {
            self.orphan_lines.push(name.to_string());
        }
    }

    fn check_all_used(&self) -> Result<(), TrackerError> {
        if self.underflowed || !self.scopes.is_empty() {
            return Err(TrackerError::UnbalancedScope);
        }
        if let Some(name) = self.orphan_lines.first() {
            return Err(TrackerError::LineWithoutKey { name: name.clone() });
        }
        let unused: Vec<String> = self.declared.difference(&self.used).cloned().collect();
        if unused.is_empty() {
            Ok(())
        } else {
            Err(TrackerError::UnusedInputs { keys: unused })
        }
    }
}

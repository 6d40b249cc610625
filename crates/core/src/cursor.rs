//! Document cursor: the zoom position inside a hierarchical document.
//!
//! A `DocCursor` borrows the parsed document for its whole lifetime and
//! tracks the subtree the legacy protocol is currently reading from, plus
//! the ancestor chain needed to climb back out. It never mutates the
//! document and it cannot outlive it.

use std::collections::BTreeSet;

use serde_json::Value;

use crate::error::DocError;
use crate::shape;

/// A stateful position inside a borrowed document.
pub struct DocCursor<'a> {
    current: &'a Value,
    stack: Vec<&'a Value>,
    /// Top-level keys of the original document, in sorted order, captured
    /// at construction. Used for diagnostic key lookup only.
    declared: Vec<String>,
    /// Fields that enumerate their group elements by countdown rather
    /// than in document order. Supplied by the caller instead of being
    /// hardcoded in the traversal.
    reversed_fields: BTreeSet<String>,
    /// Dual-purpose counter: countdown index for reversed-order subtree
    /// entry, and remaining-record counter for group enumeration.
    pub(crate) index: usize,
    /// How many times the first-enumerable-field query ran at the current
    /// zoom position. Reset on every subtree entry.
    pub(crate) record_read_count: usize,
    /// The key most recently reported by `next_sibling_key`, kept for the
    /// usage tracker side channel.
    scanned_key: String,
}

impl<'a> DocCursor<'a> {
    /// Create a cursor positioned at the document root.
    pub fn new(doc: &'a Value, reversed_fields: BTreeSet<String>) -> Self {
        let declared = match doc {
            Value::Object(map) => map.keys().cloned().collect(),
            _ => Vec::new(),
        };
        DocCursor {
            current: doc,
            stack: Vec::new(),
            declared,
            reversed_fields,
            index: 0,
            record_read_count: 0,
            scanned_key: String::new(),
        }
    }

    /// The subtree the cursor currently points at.
    pub fn current(&self) -> &'a Value {
        self.current
    }

    /// Zoom-stack depth: the number of unmatched subtree entries.
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Descend into the subtree named `field`.
    ///
    /// When the current value is an array the field is looked up in its
    /// last element first, matching the legacy layout where the
    /// record-bearing field closes the array, then among the remaining
    /// record elements. Entering a reversed-order field descends into
    /// element `count - index` of the group and decrements `index`, so
    /// repeated entries walk the group elements one per call.
    pub fn enter_subtree(&mut self, field: &str) -> Result<(), DocError> {
        let child = match self.current {
            Value::Array(elems) => elems
                .last()
                .and_then(|e| e.get(field))
                .or_else(|| elems.iter().find_map(|e| e.get(field))),
            other => other.get(field),
        }
        .ok_or_else(|| DocError::MissingSubtree {
            field: field.to_string(),
        })?;

        if self.reversed_fields.contains(field) {
            let count = shape::sibling_field_count(self.current, field);
            if self.index == 0 || self.index > count {
                return Err(DocError::GroupIndexOutOfRange {
                    field: field.to_string(),
                    index: self.index,
                    len: count,
                });
            }
            let position = count - self.index;
            let elem = child
                .get(position)
                .ok_or_else(|| DocError::GroupIndexOutOfRange {
                    field: field.to_string(),
                    index: position,
                    len: child.as_array().map(Vec::len).unwrap_or(0),
                })?;
            self.stack.push(self.current);
            self.current = elem;
            self.index -= 1;
        } else {
            self.stack.push(self.current);
            self.current = child;
        }

        self.record_read_count = 0;
        Ok(())
    }

    /// Climb back to the parent subtree.
    pub fn exit_subtree(&mut self) -> Result<(), DocError> {
        self.current = self.stack.pop().ok_or(DocError::StackUnderflow)?;
        Ok(())
    }

    /// The key that follows `prev` among the record keys of the current
    /// subtree, or the empty string when no successor exists.
    ///
    /// `prev == sentinel` is treated as "start of the list". When the
    /// current value is an array, the single keys of its elements are
    /// scanned in document order; when it is an object, its last key is
    /// reported (the degenerate single-record case). The returned key is
    /// also remembered for the usage tracker side channel.
    pub fn next_sibling_key(&mut self, prev: &str, sentinel: &str) -> String {
        let prev = if prev == sentinel { "" } else { prev };
        let key = match self.current {
            Value::Array(elems) => {
                let mut prev_seen = "";
                let mut found = "";
                'scan: for elem in elems {
                    if let Value::Object(map) = elem {
                        for k in map.keys() {
                            if prev_seen == prev {
                                found = k.as_str();
                                break 'scan;
                            }
                            prev_seen = k.as_str();
                        }
                    }
                }
                found.to_string()
            }
            Value::Object(map) => map.keys().last().cloned().unwrap_or_default(),
            _ => String::new(),
        };
        self.scanned_key = key.clone();
        key
    }

    /// The single key of element `record_read_count` of the current
    /// array, advancing the enumeration by one.
    pub fn first_enumerable_field_name(&mut self) -> Result<String, DocError> {
        let elems = match self.current {
            Value::Array(elems) if !elems.is_empty() => elems,
            _ => return Err(DocError::EmptyRecordArray),
        };
        let position = self.record_read_count;
        let elem = elems
            .get(position)
            .ok_or(DocError::MalformedRecord { position })?;
        let key = match elem {
            Value::Object(map) => map.keys().last().cloned(),
            _ => None,
        }
        .ok_or(DocError::MalformedRecord { position })?;
        self.record_read_count += 1;
        Ok(key)
    }

    /// How many first-enumerable-field queries ran at the current zoom
    /// position.
    pub fn record_read_count(&self) -> usize {
        self.record_read_count
    }

    /// Diagnostic ordinal of a declared top-level key.
    pub fn var_index(&self, name: &str) -> Result<usize, DocError> {
        self.declared
            .iter()
            .position(|k| k == name)
            .ok_or_else(|| DocError::UnknownVariable {
                name: name.to_string(),
            })
    }

    /// Top-level keys of the original document, in sorted order.
    pub fn declared_vars(&self) -> &[String] {
        &self.declared
    }

    /// The key most recently reported by [`next_sibling_key`].
    ///
    /// [`next_sibling_key`]: DocCursor::next_sibling_key
    pub fn scanned_key(&self) -> &str {
        &self.scanned_key
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn cursor(doc: &Value) -> DocCursor<'_> {
        DocCursor::new(doc, BTreeSet::new())
    }

    #[test]
    fn enter_and_exit_balance() {
        let doc = json!({"gas_mixing_ratio": {"SO2": [0.1]}});
        let mut c = cursor(&doc);
        c.enter_subtree("gas_mixing_ratio").unwrap();
        assert_eq!(c.depth(), 1);
        c.exit_subtree().unwrap();
        assert_eq!(c.depth(), 0);
        assert_eq!(c.exit_subtree(), Err(DocError::StackUnderflow));
    }

    #[test]
    fn enter_missing_subtree_fails() {
        let doc = json!({"a": 1});
        let mut c = cursor(&doc);
        assert_eq!(
            c.enter_subtree("b"),
            Err(DocError::MissingSubtree {
                field: "b".to_string()
            })
        );
    }

    #[test]
    fn enter_searches_last_array_element() {
        let doc = json!([
            {"time": [0.0]},
            {"dist": [[{"m": {}}]]}
        ]);
        let mut c = cursor(&doc);
        c.enter_subtree("dist").unwrap();
        assert_eq!(c.current(), &json!([[{"m": {}}]]));
    }

    #[test]
    fn reversed_entry_counts_down_through_group() {
        let doc = json!([
            {"dist": [["first"], ["second"]]}
        ]);
        let mut c = DocCursor::new(&doc, BTreeSet::from(["dist".to_string()]));
        c.index = 2;
        c.enter_subtree("dist").unwrap();
        assert_eq!(c.current(), &json!(["first"]));
        c.exit_subtree().unwrap();
        c.enter_subtree("dist").unwrap();
        assert_eq!(c.current(), &json!(["second"]));
        c.exit_subtree().unwrap();
        // Countdown exhausted: a further entry is a structural error.
        assert!(matches!(
            c.enter_subtree("dist"),
            Err(DocError::GroupIndexOutOfRange { .. })
        ));
    }

    #[test]
    fn sibling_key_walks_records_in_order() {
        let doc = json!([
            {"mode1": {}},
            {"mode2": {}},
            {"mode3": {}}
        ]);
        let mut c = cursor(&doc);
        assert_eq!(c.next_sibling_key("", ""), "mode1");
        assert_eq!(c.next_sibling_key("mode1", ""), "mode2");
        assert_eq!(c.next_sibling_key("mode2", ""), "mode3");
        assert_eq!(c.next_sibling_key("mode3", ""), "");
    }

    #[test]
    fn sibling_key_is_idempotent_for_fixed_prev() {
        let doc = json!([{"a": {}}, {"b": {}}]);
        let mut c = cursor(&doc);
        assert_eq!(c.next_sibling_key("a", "dist"), "b");
        assert_eq!(c.next_sibling_key("a", "dist"), "b");
    }

    #[test]
    fn sibling_key_sentinel_restarts_the_scan() {
        let doc = json!([{"a": {}}, {"b": {}}]);
        let mut c = cursor(&doc);
        assert_eq!(c.next_sibling_key("dist", "dist"), "a");
    }

    #[test]
    fn sibling_key_on_object_reports_last_key() {
        let doc = json!({"diam": [1.0], "num_conc": [2.0]});
        let mut c = cursor(&doc);
        // serde_json object keys are sorted, so num_conc is last.
        assert_eq!(c.next_sibling_key("", ""), "num_conc");
        assert_eq!(c.scanned_key(), "num_conc");
    }

    #[test]
    fn first_enumerable_advances_per_call() {
        let doc = json!([{"SO2": [0.1]}, {"NO2": [0.2]}]);
        let mut c = cursor(&doc);
        assert_eq!(c.first_enumerable_field_name().unwrap(), "SO2");
        assert_eq!(c.first_enumerable_field_name().unwrap(), "NO2");
        assert_eq!(
            c.first_enumerable_field_name(),
            Err(DocError::MalformedRecord { position: 2 })
        );
    }

    #[test]
    fn first_enumerable_on_empty_array_fails() {
        let doc = json!([]);
        let mut c = cursor(&doc);
        assert_eq!(
            c.first_enumerable_field_name(),
            Err(DocError::EmptyRecordArray)
        );
    }

    #[test]
    fn entering_a_subtree_resets_enumeration() {
        let doc = json!({"rows": [{"SO2": [0.1]}, {"NO2": [0.2]}]});
        let mut c = cursor(&doc);
        c.enter_subtree("rows").unwrap();
        c.first_enumerable_field_name().unwrap();
        c.exit_subtree().unwrap();
        c.enter_subtree("rows").unwrap();
        assert_eq!(c.first_enumerable_field_name().unwrap(), "SO2");
    }

    #[test]
    fn var_index_orders_declared_keys() {
        let doc = json!({"temp": 290.0, "pressure": 1e5, "rel_humidity": 0.95});
        let c = cursor(&doc);
        assert_eq!(c.var_index("pressure").unwrap(), 0);
        assert_eq!(c.var_index("rel_humidity").unwrap(), 1);
        assert_eq!(c.var_index("temp").unwrap(), 2);
        assert_eq!(
            c.var_index("height"),
            Err(DocError::UnknownVariable {
                name: "height".to_string()
            })
        );
    }
}

//! The line-protocol state machine over a record-structured document.
//!
//! The legacy engine has no concept of "array of records": it can only
//! ask "how many lines in this group" and "give me the next line". The
//! stream reconstructs group boundaries and record/field distinctions
//! from the zoom depth and the key sequence alone, emitting records in
//! document order and their fields as the engine descends into them.

use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeSet;

use crate::cursor::DocCursor;
use crate::error::DocError;
use crate::shape;

/// One answer to a `read_line` call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Line {
    /// A named line with its data token.
    Field { name: String, data: String },
    /// The current record group is exhausted; the engine must stop
    /// asking for lines in this group.
    GroupEnd,
}

/// Configuration fixed for the lifetime of one record stream.
#[derive(Debug, Clone, Default)]
pub struct StreamConfig {
    /// Field name that introduces a nested record group (the sentinel),
    /// e.g. a distribution list. Empty when the document root itself is
    /// the record array.
    pub record_field: String,
    /// Logical name under which a record's own key is reported as data,
    /// e.g. a mode name. Empty disables aliasing.
    pub record_alias: String,
    /// Zoom depth at which a record's body sits relative to the
    /// enclosing record array.
    pub max_depth: usize,
    /// Fields whose group elements are entered by countdown.
    pub reversed_fields: BTreeSet<String>,
}

impl StreamConfig {
    /// The conventional grouped-record configuration: a sentinel field
    /// holding the groups, entered by countdown, with record keys
    /// reported under an alias.
    pub fn records(record_field: &str, record_alias: &str) -> Self {
        StreamConfig {
            record_field: record_field.to_string(),
            record_alias: record_alias.to_string(),
            max_depth: 3,
            reversed_fields: BTreeSet::from([record_field.to_string()]),
        }
    }
}

/// A record stream over a borrowed document.
pub struct RecordStream<'a> {
    cursor: DocCursor<'a>,
    record_field: String,
    record_alias: String,
    max_depth: usize,
    last_key: String,
}

impl<'a> RecordStream<'a> {
    pub fn new(doc: &'a Value, config: StreamConfig) -> Self {
        RecordStream {
            cursor: DocCursor::new(doc, config.reversed_fields),
            record_field: config.record_field,
            record_alias: config.record_alias,
            max_depth: config.max_depth,
            last_key: String::new(),
        }
    }

    /// The underlying cursor, for scalar and array reads at the current
    /// position.
    pub fn cursor(&self) -> &DocCursor<'a> {
        &self.cursor
    }

    pub fn cursor_mut(&mut self) -> &mut DocCursor<'a> {
        &mut self.cursor
    }

    /// Emit the next line of the record stream.
    ///
    /// A call that finds the cursor at `max_depth` is the first call
    /// after a record's body was consumed: it climbs out, and either
    /// starts the following record or reports the end of the group.
    /// Starting a record (and any line whose previous key matched the
    /// sentinel while an alias is configured) reports the record's own
    /// key under the alias name and descends into its body; every other
    /// line reports the key literally without descending.
    pub fn read_line(&mut self) -> Result<Line, DocError> {
        let mut subsequent_record = false;
        if self.cursor.depth() == self.max_depth {
            self.cursor.exit_subtree()?;
            let key = self
                .cursor
                .next_sibling_key(&self.last_key, &self.record_field);
            if key.is_empty() {
                // Group exhausted. A non-zero countdown means more groups
                // remain at the parent: prime the sentinel so the next
                // call re-enters; otherwise reset to the very start.
                self.last_key = if self.cursor.index == 0 {
                    String::new()
                } else {
                    self.record_field.clone()
                };
                return Ok(Line::GroupEnd);
            }
            subsequent_record = true;
        }

        let key = self
            .cursor
            .next_sibling_key(&self.last_key, &self.record_field);
        let name = if subsequent_record
            || (!self.record_alias.is_empty() && self.last_key == self.record_field)
        {
            self.cursor.enter_subtree(&key)?;
            self.record_alias.clone()
        } else {
            key.clone()
        };
        self.last_key = key.clone();
        Ok(Line::Field { name, data: key })
    }

    /// Size hint for the current group: how many `read_line` groups the
    /// engine should expect.
    ///
    /// At the record array's parent this counts the elements under the
    /// sentinel field and arms the countdown; anywhere else a single
    /// scalar line follows.
    pub fn line_record_count(&mut self) -> usize {
        if self.cursor.depth() + 2 == self.max_depth {
            self.cursor.index =
                shape::sibling_field_count(self.cursor.current(), &self.record_field);
            return self.cursor.index;
        }
        1
    }

    /// The key most recently scanned by the stream, for the usage
    /// tracker's consistency side channel.
    pub fn scanned_key(&self) -> &str {
        self.cursor.scanned_key()
    }
}

/// Whether every record key across the elements of a record array is
/// unique. Duplicate record names make the line protocol ambiguous.
pub fn unique_record_keys(doc: &Value) -> bool {
    let mut seen = BTreeSet::new();
    if let Value::Array(elems) = doc {
        for elem in elems {
            if let Value::Object(map) = elem {
                for key in map.keys() {
                    if !seen.insert(key.as_str()) {
                        return false;
                    }
                }
            }
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn field(name: &str, data: &str) -> Line {
        Line::Field {
            name: name.to_string(),
            data: data.to_string(),
        }
    }

    #[test]
    fn flat_record_array_enumerates_in_document_order() {
        let doc = json!([
            {"mode1": {"diam": [1e-6, 2e-6]}},
            {"mode2": {"diam": [3e-6]}}
        ]);
        let config = StreamConfig {
            record_field: String::new(),
            record_alias: "mode_name".to_string(),
            max_depth: 1,
            reversed_fields: BTreeSet::new(),
        };
        let mut stream = RecordStream::new(&doc, config);

        // First record: aliased key, descends into the body.
        assert_eq!(stream.read_line().unwrap(), field("mode_name", "mode1"));
        assert_eq!(stream.cursor().depth(), 1);
        let mut diam = [0.0; 2];
        stream.cursor().read_array("diam", &mut diam).unwrap();
        assert_eq!(diam, [1e-6, 2e-6]);

        // Second record.
        assert_eq!(stream.read_line().unwrap(), field("mode_name", "mode2"));
        let mut diam = [0.0; 1];
        stream.cursor().read_array("diam", &mut diam).unwrap();
        assert_eq!(diam, [3e-6]);

        // Exhausted: the call after the last record ends the group.
        assert_eq!(stream.read_line().unwrap(), Line::GroupEnd);
        assert_eq!(stream.cursor().depth(), 0);
    }

    #[test]
    fn grouped_records_walk_every_group_through_the_countdown() {
        let doc = json!({
            "em": [
                {"dist": [
                    [
                        {"small": {"num_conc": [1e9]}},
                        {"large": {"num_conc": [2e7]}}
                    ],
                    [
                        {"background": {"num_conc": [5e8]}}
                    ]
                ]}
            ]
        });
        let mut stream = RecordStream::new(&doc, StreamConfig::records("dist", "mode_name"));
        stream.cursor_mut().enter_subtree("em").unwrap();

        // Positioned at the record array's parent: count and arm.
        assert_eq!(stream.line_record_count(), 2);

        // The sentinel line itself is reported literally.
        assert_eq!(stream.read_line().unwrap(), field("dist", "dist"));

        // The engine opens the sentinel scope: countdown picks group 0.
        stream.cursor_mut().enter_subtree("dist").unwrap();
        assert_eq!(stream.read_line().unwrap(), field("mode_name", "small"));
        assert_eq!(stream.read_line().unwrap(), field("mode_name", "large"));
        assert_eq!(stream.read_line().unwrap(), Line::GroupEnd);
        stream.cursor_mut().exit_subtree().unwrap();

        // One group remains: the next line re-enters through the
        // sentinel and picks group 1.
        assert_eq!(stream.read_line().unwrap(), field("mode_name", "dist"));
        assert_eq!(
            stream.read_line().unwrap(),
            field("mode_name", "background")
        );
        assert_eq!(stream.read_line().unwrap(), Line::GroupEnd);

        // Countdown hit zero on the final group end.
        stream.cursor_mut().exit_subtree().unwrap();
        stream.cursor_mut().exit_subtree().unwrap();
        assert_eq!(stream.cursor().depth(), 0);
    }

    #[test]
    fn count_away_from_the_group_parent_is_one() {
        let doc = json!({"scale": 1.5});
        let mut stream = RecordStream::new(&doc, StreamConfig::records("dist", "mode_name"));
        // Depth 0, max depth 3: not at the group parent.
        assert_eq!(stream.line_record_count(), 1);
    }

    #[test]
    fn group_end_resets_for_a_rescan_when_no_groups_remain() {
        let doc = json!([{"only": {"gsd": 1.2}}]);
        let config = StreamConfig {
            record_field: String::new(),
            record_alias: "mode_name".to_string(),
            max_depth: 1,
            reversed_fields: BTreeSet::new(),
        };
        let mut stream = RecordStream::new(&doc, config);
        assert_eq!(stream.read_line().unwrap(), field("mode_name", "only"));
        assert_eq!(stream.read_line().unwrap(), Line::GroupEnd);
        // The reset allows the engine to replay from the first record.
        assert_eq!(stream.read_line().unwrap(), field("mode_name", "only"));
    }

    #[test]
    fn scanned_key_follows_the_stream() {
        let doc = json!([{"mode1": {}}, {"mode2": {}}]);
        let config = StreamConfig {
            record_field: String::new(),
            record_alias: "mode_name".to_string(),
            max_depth: 1,
            reversed_fields: BTreeSet::new(),
        };
        let mut stream = RecordStream::new(&doc, config);
        stream.read_line().unwrap();
        assert_eq!(stream.scanned_key(), "mode1");
    }

    #[test]
    fn unique_keys_detects_duplicates() {
        assert!(unique_record_keys(&json!([
            {"mode1": {}},
            {"mode2": {}}
        ])));
        assert!(!unique_record_keys(&json!([
            {"mode1": {}},
            {"mode1": {}}
        ])));
        assert!(unique_record_keys(&json!([])));
    }
}

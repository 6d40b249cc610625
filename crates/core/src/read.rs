//! Typed scalar, string and array reads from the cursor's subtree.
//!
//! Every missing key or type mismatch is a typed error. The legacy code
//! logged a warning and read on through an invalid handle; here the read
//! protocol is required to fail the parse instead.

use serde_json::Value;

use crate::cursor::DocCursor;
use crate::error::DocError;

/// Conversion from a document value into a protocol scalar.
pub trait FromDocValue: Sized {
    /// Human-readable type name used in mismatch errors.
    const EXPECTED: &'static str;

    fn from_doc_value(v: &Value) -> Option<Self>;
}

impl FromDocValue for f64 {
    const EXPECTED: &'static str = "a number";

    fn from_doc_value(v: &Value) -> Option<Self> {
        v.as_f64()
    }
}

impl FromDocValue for i64 {
    const EXPECTED: &'static str = "an integer";

    fn from_doc_value(v: &Value) -> Option<Self> {
        v.as_i64()
    }
}

impl FromDocValue for bool {
    const EXPECTED: &'static str = "a boolean";

    fn from_doc_value(v: &Value) -> Option<Self> {
        v.as_bool()
    }
}

/// Result of a bounded string read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StringRead {
    /// The string clamped to the caller's length bound.
    pub data: String,
    /// The actual length before clamping.
    pub len: usize,
    /// Whether clamping lost characters.
    pub truncated: bool,
}

impl<'a> DocCursor<'a> {
    /// Read the scalar field `name` from the current subtree.
    pub fn read_scalar<T: FromDocValue>(&self, name: &str) -> Result<T, DocError> {
        let value = self
            .current()
            .get(name)
            .ok_or_else(|| DocError::MissingEntry {
                key: name.to_string(),
            })?;
        T::from_doc_value(value).ok_or_else(|| DocError::TypeMismatch {
            key: name.to_string(),
            expected: T::EXPECTED,
        })
    }

    /// Read the string field `name`, bounding it to `max_len` characters.
    ///
    /// When the matched value is an array, the key itself is the string
    /// (the legacy encoding for name-only entries); otherwise the value
    /// must be, or directly contain, a string.
    pub fn read_string(&self, name: &str, max_len: usize) -> Result<StringRead, DocError> {
        let value = self
            .current()
            .get(name)
            .ok_or_else(|| DocError::MissingEntry {
                key: name.to_string(),
            })?;
        let full = match value {
            Value::Array(_) => name.to_string(),
            Value::String(s) => s.clone(),
            Value::Object(map) => match map.values().next() {
                Some(Value::String(s)) => s.clone(),
                _ => {
                    return Err(DocError::TypeMismatch {
                        key: name.to_string(),
                        expected: "a string",
                    })
                }
            },
            _ => {
                return Err(DocError::TypeMismatch {
                    key: name.to_string(),
                    expected: "a string",
                })
            }
        };
        let len = full.chars().count();
        if len > max_len {
            Ok(StringRead {
                data: full.chars().take(max_len).collect(),
                len,
                truncated: true,
            })
        } else {
            Ok(StringRead {
                data: full,
                len,
                truncated: false,
            })
        }
    }

    /// Copy the numeric array field `name` into `out`, positionally.
    ///
    /// The field is looked up directly when the current subtree is an
    /// object, then among the single-key records of the current array (or
    /// of any record array nested one level below an object). Length
    /// mismatches between source and destination fail instead of
    /// overrunning.
    pub fn read_array(&self, name: &str, out: &mut [f64]) -> Result<(), DocError> {
        let found = find_array_entry(self.current(), name).ok_or_else(|| {
            DocError::MissingEntry {
                key: name.to_string(),
            }
        })?;
        let entries = found.as_array().ok_or_else(|| DocError::TypeMismatch {
            key: name.to_string(),
            expected: "an array of numbers",
        })?;
        if entries.len() != out.len() {
            return Err(DocError::LengthMismatch {
                key: name.to_string(),
                expected: out.len(),
                actual: entries.len(),
            });
        }
        for (slot, entry) in out.iter_mut().zip(entries) {
            *slot = entry.as_f64().ok_or_else(|| DocError::TypeMismatch {
                key: name.to_string(),
                expected: "an array of numbers",
            })?;
        }
        Ok(())
    }

    /// Read the time axis and the values of a time-paired array.
    ///
    /// The time axis lives under the conventional `"time"` key next to
    /// the named values.
    pub fn read_timed_array(
        &self,
        name: &str,
        times: &mut [f64],
        vals: &mut [f64],
    ) -> Result<(), DocError> {
        self.read_array("time", times)?;
        self.read_array(name, vals)
    }
}

/// Locate the array value keyed `name` in `current`: a direct object
/// field, a record of the current array, or a record of an array sitting
/// one level below an object field.
fn find_array_entry<'v>(current: &'v Value, name: &str) -> Option<&'v Value> {
    match current {
        Value::Object(map) => {
            if let Some(v) = map.get(name) {
                return Some(v);
            }
            for v in map.values() {
                if let Value::Array(elems) = v {
                    if let Some(found) = scan_records(elems, name) {
                        return Some(found);
                    }
                }
            }
            None
        }
        Value::Array(elems) => scan_records(elems, name),
        _ => None,
    }
}

fn scan_records<'v>(elems: &'v [Value], name: &str) -> Option<&'v Value> {
    for elem in elems {
        if let Value::Object(map) = elem {
            if let Some(v) = map.get(name) {
                return Some(v);
            }
        }
    }
    None
}

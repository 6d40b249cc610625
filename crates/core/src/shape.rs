//! Shape discovery: read-only queries over the subtree a cursor points at.
//!
//! The legacy read protocol asks for sizes before data (how many time
//! points, how many table rows, how many records in a group). Those sizes
//! are implicit in the document layout, so they are reconstructed here by
//! scanning the current subtree.

use serde_json::Value;

use crate::error::DocError;

/// Element count of the field named `name` in the current subtree.
///
/// When the subtree is an array of records, every element is scanned and
/// the last field named `name` wins, matching the legacy scan. Returns 0
/// when no such field exists.
pub fn sibling_field_count(current: &Value, name: &str) -> usize {
    match current {
        Value::Array(elems) => {
            let mut n = 0;
            for elem in elems {
                if let Value::Object(map) = elem {
                    if let Some(v) = map.get(name) {
                        n = value_size(v);
                    }
                }
            }
            n
        }
        Value::Object(map) => map.get(name).map(value_size).unwrap_or(0),
        _ => 0,
    }
}

/// Number of elements of the current array that hold a numeric table row:
/// a single-key object whose value is an array that is empty or starts
/// with a number. Rows of nested records do not count.
pub fn numeric_record_count(current: &Value) -> Result<usize, DocError> {
    let elems = match current {
        Value::Array(elems) => elems,
        _ => return Ok(0),
    };
    let mut count = 0;
    for (position, elem) in elems.iter().enumerate() {
        let (_, value) = single_key(elem, position)?;
        if let Value::Array(entries) = value {
            if entries.is_empty() || entries[0].is_number() {
                count += 1;
            }
        }
    }
    Ok(count)
}

/// The single key and value of a record element.
pub fn single_key(elem: &Value, position: usize) -> Result<(&str, &Value), DocError> {
    match elem {
        Value::Object(map) if map.len() == 1 => {
            let (k, v) = map.iter().next().ok_or(DocError::MalformedRecord { position })?;
            Ok((k.as_str(), v))
        }
        _ => Err(DocError::MalformedRecord { position }),
    }
}

/// The number of entries a document value contributes when asked for its
/// size: array and object lengths, 1 for scalars, 0 for null.
fn value_size(v: &Value) -> usize {
    match v {
        Value::Array(a) => a.len(),
        Value::Object(m) => m.len(),
        Value::Null => 0,
        _ => 1,
    }
}

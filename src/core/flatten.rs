//! Nested payload flattening.
//!
//! Storefront payloads arrive as arbitrarily nested JSON. Analytics sinks only
//! accept a single level of properties, so every leaf is lifted to the top
//! level under the path of its ancestors joined with [`SEPARATOR`]:
//!
//! ```
//! use pixelflag::core::flatten;
//! use serde_json::json;
//!
//! let flat = flatten(&json!({"a": {"b": 1, "c": [2, 3]}}));
//! assert_eq!(flat["a_b"], 1);
//! assert_eq!(flat["a_c_0"], 2);
//! assert_eq!(flat["a_c_1"], 3);
//! ```

use serde_json::{Map, Value};

/// Joins ancestor keys and array indices.
pub const SEPARATOR: &str = "_";

/// Single-level mapping from joined path to primitive value.
///
/// Backed by an insertion-ordered map, but callers must not rely on the order.
pub type FlatRecord = Map<String, Value>;

/// Flatten `value` with the default `_` separator.
pub fn flatten(value: &Value) -> FlatRecord {
    flatten_with(value, SEPARATOR)
}

/// Flatten `value`, joining path segments with `separator`.
///
/// - Top-level keys are emitted unprefixed.
/// - Empty objects and arrays produce no keys.
/// - `null` is a leaf like any other primitive.
/// - A primitive at the root is stored under the empty key.
/// - Segments are joined literally, so an empty-string key yields a doubled
///   separator (`{"a": {"": {"b": 1}}}` gives `a__b`).
/// - When two paths join to the same text the later leaf wins.
pub fn flatten_with(value: &Value, separator: &str) -> FlatRecord {
    let mut result = FlatRecord::new();
    flatten_into(value, None, separator, &mut result);
    result
}

/// Number of primitive leaves in `value`.
///
/// Equals `flatten(value).len()` whenever no two paths join to the same key.
pub fn count_leaves(value: &Value) -> usize {
    match value {
        Value::Object(map) => map.values().map(count_leaves).sum(),
        Value::Array(arr) => arr.iter().map(count_leaves).sum(),
        _ => 1,
    }
}

fn join(prefix: Option<&str>, segment: &str, separator: &str) -> String {
    match prefix {
        Some(prefix) => format!("{}{}{}", prefix, separator, segment),
        None => segment.to_string(),
    }
}

fn flatten_into(value: &Value, prefix: Option<&str>, separator: &str, result: &mut FlatRecord) {
    match value {
        Value::Object(map) => {
            for (key, val) in map {
                let path = join(prefix, key, separator);
                flatten_into(val, Some(&path), separator, result);
            }
        }
        Value::Array(arr) => {
            for (index, val) in arr.iter().enumerate() {
                let path = join(prefix, &index.to_string(), separator);
                flatten_into(val, Some(&path), separator, result);
            }
        }
        leaf => {
            result.insert(prefix.unwrap_or_default().to_string(), leaf.clone());
        }
    }
}

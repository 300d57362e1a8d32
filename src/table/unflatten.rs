use crate::table::types::FlatRow;
use serde_json::{Map, Value};

/// Reconstruct a nested JSON value from a flat dot-notation row.
///
/// The inverse of [`flatten()`](crate::table::flatten()): path segments are split
/// on `.`, a segment addresses an array when the segment after it is all
/// digits, and string cells that look like serialized JSON (leading `[` or
/// `{`) are parsed back into structure. For any acyclic value `x` without
/// index/key collisions, `unflatten(&flatten(&x).rows[0]) == x`.
pub fn unflatten(row: &FlatRow) -> Value {
    let mut root = root_container(row);

    for (key, value) in row {
        let segments: Vec<&str> = key.split('.').collect();
        insert_path(&mut root, &segments, revive(value));
    }

    root
}

/// The root is an array when the row's paths start with digit segments.
fn root_container(row: &FlatRow) -> Value {
    let array_root = row
        .keys()
        .next()
        .and_then(|key| key.split('.').next())
        .map(is_index)
        .unwrap_or(false);

    if array_root {
        Value::Array(Vec::new())
    } else {
        Value::Object(Map::new())
    }
}

/// Re-parse string cells holding serialized sub-structures; anything that
/// fails to parse stays a literal string.
fn revive(value: &Value) -> Value {
    if let Value::String(s) = value {
        let trimmed = s.trim_start();
        if trimmed.starts_with('[') || trimmed.starts_with('{') {
            if let Ok(parsed) = serde_json::from_str(s) {
                return parsed;
            }
        }
    }
    value.clone()
}

fn insert_path(root: &mut Value, segments: &[&str], value: Value) {
    let mut cursor = root;
    for pos in 0..segments.len() - 1 {
        let next_is_index = is_index(segments[pos + 1]);
        cursor = descend(cursor, segments[pos], next_is_index);
    }
    place(cursor, segments[segments.len() - 1], value);
}

/// Walk into (creating if needed) the container at `segment`.
fn descend<'a>(container: &'a mut Value, segment: &str, next_is_index: bool) -> &'a mut Value {
    match container {
        Value::Object(map) => {
            let slot = map.entry(segment.to_string()).or_insert(Value::Null);
            ensure_container(slot, next_is_index);
            slot
        }
        Value::Array(items) => {
            let index = segment.parse::<usize>().unwrap_or(0);
            if items.len() <= index {
                items.resize(index + 1, Value::Null);
            }
            let slot = &mut items[index];
            ensure_container(slot, next_is_index);
            slot
        }
        // The cursor always points at a container; nothing to walk otherwise.
        other => other,
    }
}

/// Make `slot` the right kind of container, keeping one that already matches.
fn ensure_container(slot: &mut Value, array: bool) {
    let matches = match slot {
        Value::Array(_) => array,
        Value::Object(_) => !array,
        _ => false,
    };
    if !matches {
        *slot = if array {
            Value::Array(Vec::new())
        } else {
            Value::Object(Map::new())
        };
    }
}

fn place(container: &mut Value, segment: &str, value: Value) {
    match container {
        Value::Object(map) => {
            map.insert(segment.to_string(), value);
        }
        Value::Array(items) => {
            if let Ok(index) = segment.parse::<usize>() {
                if items.len() <= index {
                    items.resize(index + 1, Value::Null);
                }
                items[index] = value;
            }
        }
        _ => {}
    }
}

fn is_index(segment: &str) -> bool {
    !segment.is_empty() && segment.bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::flatten::flatten;
    use serde_json::json;

    fn row_of(value: Value) -> FlatRow {
        match value {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_round_trip_through_flatten() {
        let original = json!({
            "age": 30,
            "user": {"name": "John", "tags": ["a", "b"]}
        });

        let result = flatten(&original);
        assert_eq!(unflatten(&result.rows[0]), original);
    }

    #[test]
    fn test_round_trip_preserves_nulls() {
        let original = json!({"a": null, "b": 1});

        let result = flatten(&original);
        assert_eq!(unflatten(&result.rows[0]), original);
    }

    #[test]
    fn test_indexed_segments_rebuild_arrays() {
        let row = row_of(json!({"items.0.a": 1, "items.1.b": 2}));

        assert_eq!(
            unflatten(&row),
            json!({"items": [{"a": 1}, {"b": 2}]})
        );
    }

    #[test]
    fn test_digit_keys_make_the_root_an_array() {
        let row = row_of(json!({"0": "a", "1": "b"}));

        assert_eq!(unflatten(&row), json!(["a", "b"]));
    }

    #[test]
    fn test_serialized_json_strings_are_revived() {
        let row = row_of(json!({"tags": "[\"a\",\"b\"]"}));

        assert_eq!(unflatten(&row), json!({"tags": ["a", "b"]}));
    }

    #[test]
    fn test_json_looking_text_that_fails_to_parse_stays_literal() {
        let row = row_of(json!({"note": "{not json"}));

        assert_eq!(unflatten(&row), json!({"note": "{not json"}));
    }

    #[test]
    fn test_sparse_indices_pad_with_null() {
        let row = row_of(json!({"items.2": "x"}));

        assert_eq!(unflatten(&row), json!({"items": [null, null, "x"]}));
    }
}

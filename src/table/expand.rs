use crate::table::classify::{classify, ArrayKind};
use crate::table::types::{join_key, leaf_key, FlatRow, FlattenResult, Schema};
use serde_json::{Map, Value};
use std::collections::HashSet;

/// Expand nested arrays of objects into one row per leaf array item, with
/// parent scalar fields repeated on every child row.
///
/// This is the relational "unwind" view: an array of three objects turns one
/// input row into three output rows, the opposite tradeoff from
/// [`flatten()`](crate::table::flatten())'s indexed-column expansion. Sibling
/// nested arrays at the same object level are combined as a Cartesian
/// product, so the row count is exponential in the number of such siblings;
/// no cap is applied.
///
/// The returned schema has the common leading path stripped from the column
/// names (`products.sku` becomes `sku` when nothing else claims the name).
pub fn expand_to_table(data: &Value) -> FlattenResult {
    let elements: &[Value] = match data {
        Value::Null => return FlattenResult::empty(),
        Value::Array(items) if items.is_empty() => return FlattenResult::empty(),
        Value::Array(items) => items,
        other => std::slice::from_ref(other),
    };

    let mut rows: Vec<FlatRow> = Vec::new();
    for element in elements {
        rows.extend(expand_value(element, "", &Map::new()));
    }

    let original = collect_keys(&rows);
    let display = strip_common_prefix(&original);
    let rows = remap_rows(rows, &original, &display);
    FlattenResult {
        rows,
        schema: display,
    }
}

/// Expand one value into rows, carrying the accumulated parent context.
fn expand_value(value: &Value, prefix: &str, parent: &FlatRow) -> Vec<FlatRow> {
    match value {
        Value::Object(map) => expand_object(map, prefix, parent),
        Value::Array(items) => {
            if items.is_empty() {
                vec![with_entry(parent, prefix, Value::Null)]
            } else if classify(items) == ArrayKind::Primitives {
                vec![with_entry(parent, prefix, Value::String(join_primitives(items)))]
            } else {
                // Row multiplication: each element becomes its own row (or
                // rows), all carrying the parent context forward.
                let mut rows = Vec::new();
                for item in items {
                    rows.extend(expand_value(item, prefix, parent));
                }
                rows
            }
        }
        scalar => vec![with_entry(parent, prefix, scalar.clone())],
    }
}

fn expand_object(map: &Map<String, Value>, prefix: &str, parent: &FlatRow) -> Vec<FlatRow> {
    let mut context = parent.clone();
    let mut complex: Vec<(&String, &Value)> = Vec::new();

    for (key, value) in map {
        let path = join_key(prefix, key);
        match value {
            Value::Object(_) => complex.push((key, value)),
            Value::Array(items) => {
                if items.is_empty() {
                    context.insert(path, Value::Null);
                } else if classify(items) == ArrayKind::Primitives {
                    context.insert(path, Value::String(join_primitives(items)));
                } else {
                    complex.push((key, value));
                }
            }
            scalar => {
                context.insert(path, scalar.clone());
            }
        }
    }

    if complex.is_empty() {
        return vec![context];
    }

    // Cross-join: expand the first complex field into N rows, then re-expand
    // each subsequent field against every row produced so far.
    let mut rows = vec![context];
    for (key, value) in complex {
        let path = join_key(prefix, key);
        let mut joined = Vec::new();
        for row in &rows {
            joined.extend(expand_value(value, &path, row));
        }
        rows = joined;
    }
    rows
}

fn with_entry(parent: &FlatRow, prefix: &str, value: Value) -> FlatRow {
    let mut row = parent.clone();
    row.insert(leaf_key(prefix), value);
    row
}

/// Render a primitive array as human-readable text. Nulls render empty,
/// matching spreadsheet join conventions.
fn join_primitives(items: &[Value]) -> String {
    let parts: Vec<String> = items
        .iter()
        .map(|item| match item {
            Value::Null => String::new(),
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
        .collect();
    parts.join(", ")
}

/// Union of keys across rows in first-encounter order.
fn collect_keys(rows: &[FlatRow]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut keys: Vec<String> = Vec::new();
    for row in rows {
        for key in row.keys() {
            if seen.insert(key.clone()) {
                keys.push(key.clone());
            }
        }
    }
    keys
}

/// Strip leading path segments for display: a segment is removed while every
/// dotted key agrees on it, no key would be emptied, and the shortened names
/// collide with nothing else in the schema.
fn strip_common_prefix(keys: &[String]) -> Schema {
    let mut segments: Vec<Vec<&str>> = keys.iter().map(|key| key.split('.').collect()).collect();

    loop {
        let dotted: Vec<usize> = (0..segments.len())
            .filter(|&i| segments[i].len() > 1)
            .collect();
        if dotted.is_empty() {
            break;
        }

        let lead = segments[dotted[0]][0];
        if !dotted.iter().all(|&i| segments[i][0] == lead) {
            break;
        }

        let mut candidate = segments.clone();
        for &i in &dotted {
            candidate[i].remove(0);
        }

        let mut names = HashSet::new();
        if !candidate.iter().all(|segs| names.insert(segs.join("."))) {
            break;
        }

        segments = candidate;
    }

    segments
        .into_iter()
        .map(|segs| segs.join("."))
        .collect()
}

/// Remap rows from original keys to display keys positionally, filling
/// absent columns with `null`.
fn remap_rows(rows: Vec<FlatRow>, original: &[String], display: &[String]) -> Vec<FlatRow> {
    rows.into_iter()
        .map(|mut row| {
            let mut remapped = Map::new();
            for (from, to) in original.iter().zip(display) {
                let value = row.remove(from).unwrap_or(Value::Null);
                remapped.insert(to.clone(), value);
            }
            remapped
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_array_of_objects_multiplies_rows() {
        let result = expand_to_table(&json!({
            "sku": "X",
            "variants": [{"size": "S"}, {"size": "M"}]
        }));

        assert_eq!(result.rows.len(), 2);
        assert_eq!(result.schema, vec!["sku", "size"]);
        assert_eq!(result.rows[0].get("sku").unwrap(), "X");
        assert_eq!(result.rows[1].get("sku").unwrap(), "X");
        assert_eq!(result.rows[0].get("size").unwrap(), "S");
        assert_eq!(result.rows[1].get("size").unwrap(), "M");
    }

    #[test]
    fn test_sibling_arrays_cross_join() {
        let result = expand_to_table(&json!({
            "id": 1,
            "colors": [{"c": "red"}, {"c": "blue"}],
            "sizes": [{"s": "S"}, {"s": "M"}]
        }));

        assert_eq!(result.rows.len(), 4);
        for row in &result.rows {
            assert_eq!(row.get("id").unwrap(), 1);
        }
    }

    #[test]
    fn test_primitive_array_joins_into_text() {
        let result = expand_to_table(&json!({"id": 1, "tags": ["a", "b"]}));

        assert_eq!(result.rows.len(), 1);
        assert_eq!(result.rows[0].get("tags").unwrap(), "a, b");
    }

    #[test]
    fn test_null_elements_render_empty_in_joined_text() {
        let result = expand_to_table(&json!({"tags": [null, 1]}));

        assert_eq!(result.rows[0].get("tags").unwrap(), ", 1");
    }

    #[test]
    fn test_empty_array_becomes_null_cell() {
        let result = expand_to_table(&json!({"id": 1, "items": []}));

        assert_eq!(result.rows.len(), 1);
        assert_eq!(result.rows[0].get("items").unwrap(), &Value::Null);
    }

    #[test]
    fn test_shared_prefix_is_stripped() {
        let result = expand_to_table(&json!([
            {"products": {"sku": "A", "qty": 1}},
            {"products": {"sku": "B", "qty": 2}}
        ]));

        assert_eq!(result.schema, vec!["qty", "sku"]);
    }

    #[test]
    fn test_prefix_kept_when_stripping_would_collide() {
        let result = expand_to_table(&json!({
            "id": 1,
            "items": [{"id": 10}, {"id": 11}]
        }));

        assert!(result.schema.contains(&String::from("id")));
        assert!(result.schema.contains(&String::from("items.id")));
    }

    #[test]
    fn test_deep_nesting_repeats_parent_context() {
        let result = expand_to_table(&json!({
            "order": "O1",
            "lines": [
                {"sku": "A", "shipments": [{"carrier": "x"}, {"carrier": "y"}]},
                {"sku": "B", "shipments": [{"carrier": "z"}]}
            ]
        }));

        assert_eq!(result.rows.len(), 3);
        for row in &result.rows {
            assert_eq!(row.get("order").unwrap(), "O1");
        }
        assert_eq!(result.rows[2].get("carrier").unwrap(), "z");
        assert_eq!(result.rows[2].get("sku").unwrap(), "B");
    }

    #[test]
    fn test_rows_are_normalized_to_the_display_schema() {
        let result = expand_to_table(&json!([
            {"a": 1},
            {"b": 2}
        ]));

        for row in &result.rows {
            assert_eq!(row.len(), result.schema.len());
        }
        assert_eq!(result.rows[0].get("b").unwrap(), &Value::Null);
    }

    #[test]
    fn test_empty_inputs_produce_empty_results() {
        assert!(expand_to_table(&Value::Null).is_empty());
        assert!(expand_to_table(&json!([])).is_empty());
    }
}

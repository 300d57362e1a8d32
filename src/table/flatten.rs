use crate::table::classify::{classify, ArrayKind};
use crate::table::types::{join_key, leaf_key, FlatRow, FlattenConfig, FlattenResult, Schema};
use serde_json::{Map, Value};
use std::collections::HashSet;

/// Sentinel written when the same node is reached twice along one descent
/// path instead of recursing into it.
pub const CIRCULAR_SENTINEL: &str = "[Circular Reference]";

/// The core flattener: converts a JSON value into uniform rows keyed by
/// dot-notation paths.
///
/// Each top-level element becomes exactly one row. Arrays of objects are
/// expanded into indexed columns (`items.0.a`) up to the configured depth;
/// all other arrays are serialized to compact JSON strings. This is column
/// expansion, not row multiplication; for the one-row-per-array-item view
/// see [`expand_to_table`](crate::table::expand_to_table).
pub struct Flattener {
    config: FlattenConfig,
}

impl Flattener {
    pub fn new(config: FlattenConfig) -> Self {
        Flattener { config }
    }

    /// Flatten a JSON value into rows and a sorted column schema.
    pub fn flatten(&self, data: &Value) -> FlattenResult {
        let elements = match top_level_elements(data) {
            Some(elements) => elements,
            None => return FlattenResult::empty(),
        };

        let mut rows: Vec<FlatRow> = Vec::with_capacity(elements.len());
        for element in elements {
            let mut row = Map::new();
            self.flatten_value(element, "", 0, &HashSet::new(), &mut row);
            rows.push(row);
        }

        let schema = collect_schema(&rows);
        let rows = normalize_rows(rows, &schema);
        FlattenResult { rows, schema }
    }

    /// Schema preview without full row materialization: the key-collection
    /// pass only, restricted to the first `schema_sample_size` elements.
    pub fn infer_schema(&self, data: &Value) -> Schema {
        let elements = match top_level_elements(data) {
            Some(elements) => elements,
            None => return Vec::new(),
        };

        let sample = &elements[..elements.len().min(self.config.schema_sample_size)];
        let mut rows: Vec<FlatRow> = Vec::with_capacity(sample.len());
        for element in sample {
            let mut row = Map::new();
            self.flatten_value(element, "", 0, &HashSet::new(), &mut row);
            rows.push(row);
        }

        collect_schema(&rows)
    }

    /// Recursively flatten one value into `row` under `prefix`.
    ///
    /// `array_depth` counts how many expanded arrays the descent has passed
    /// through; `visited` holds the node identities of the current path and
    /// is snapshot-cloned at each branch so unrelated siblings never see
    /// each other's entries.
    fn flatten_value(
        &self,
        value: &Value,
        prefix: &str,
        array_depth: usize,
        visited: &HashSet<*const Value>,
        row: &mut FlatRow,
    ) {
        match value {
            Value::Object(map) => {
                if visited.contains(&(value as *const Value)) {
                    row.insert(leaf_key(prefix), Value::String(CIRCULAR_SENTINEL.to_string()));
                    return;
                }
                let mut seen = visited.clone();
                seen.insert(value as *const Value);

                for (key, child) in map {
                    let child_key = join_key(prefix, key);
                    self.flatten_value(child, &child_key, array_depth, &seen, row);
                }
            }
            Value::Array(items) => {
                if visited.contains(&(value as *const Value)) {
                    row.insert(leaf_key(prefix), Value::String(CIRCULAR_SENTINEL.to_string()));
                    return;
                }

                // Past the expansion cap, the whole array is one serialized cell.
                if array_depth >= self.config.max_array_depth {
                    row.insert(leaf_key(prefix), Value::String(to_compact_json(value)));
                    return;
                }

                match classify(items) {
                    ArrayKind::Objects => {
                        let mut seen = visited.clone();
                        seen.insert(value as *const Value);

                        for (index, item) in items.iter().enumerate() {
                            let child_key = join_key(prefix, &index.to_string());
                            self.flatten_value(item, &child_key, array_depth + 1, &seen, row);
                        }
                    }
                    ArrayKind::Primitives | ArrayKind::Nested | ArrayKind::Mixed => {
                        row.insert(leaf_key(prefix), Value::String(to_compact_json(value)));
                    }
                }
            }
            scalar => {
                row.insert(leaf_key(prefix), scalar.clone());
            }
        }
    }
}

/// Flatten with the default configuration.
pub fn flatten(data: &Value) -> FlattenResult {
    Flattener::new(FlattenConfig::default()).flatten(data)
}

/// Schema preview with the default configuration and an explicit sample size.
pub fn infer_schema(data: &Value, sample_size: usize) -> Schema {
    let config = FlattenConfig {
        schema_sample_size: sample_size,
        ..FlattenConfig::default()
    };
    Flattener::new(config).infer_schema(data)
}

/// Null and empty arrays produce no rows; a bare value is a sequence of one.
fn top_level_elements(data: &Value) -> Option<&[Value]> {
    match data {
        Value::Null => None,
        Value::Array(items) if items.is_empty() => None,
        Value::Array(items) => Some(items),
        other => Some(std::slice::from_ref(other)),
    }
}

fn to_compact_json(value: &Value) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| String::from("null"))
}

/// Union of all keys across rows, sorted lexicographically on the full path.
pub(crate) fn collect_schema(rows: &[FlatRow]) -> Schema {
    let mut seen = HashSet::new();
    let mut keys: Vec<String> = Vec::new();
    for row in rows {
        for key in row.keys() {
            if seen.insert(key.clone()) {
                keys.push(key.clone());
            }
        }
    }
    keys.sort();
    keys
}

/// Give every row the full schema key set, filling gaps with `null`.
pub(crate) fn normalize_rows(rows: Vec<FlatRow>, schema: &[String]) -> Vec<FlatRow> {
    rows.into_iter()
        .map(|mut row| {
            let mut normalized = Map::new();
            for key in schema {
                let value = row.remove(key).unwrap_or(Value::Null);
                normalized.insert(key.clone(), value);
            }
            normalized
        })
        .collect()
}

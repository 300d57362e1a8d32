use serde::Serialize;
use serde_json::{Map, Value};

/// One output row: column key (dot-delimited path) mapped to a scalar value
/// or a JSON-serialized sub-structure.
pub type FlatRow = Map<String, Value>;

/// Ordered sequence of unique column keys for a conversion.
pub type Schema = Vec<String>;

/// The product of a transformation: uniform rows plus their column schema.
///
/// Every row holds exactly the schema's key set; values absent from the
/// source are filled with `null`, never omitted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlattenResult {
    pub rows: Vec<FlatRow>,
    pub schema: Schema,
}

impl FlattenResult {
    pub fn empty() -> Self {
        FlattenResult {
            rows: Vec::new(),
            schema: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Configuration for the flattening process
#[derive(Debug, Clone)]
pub struct FlattenConfig {
    /// How many levels of array-of-objects are expanded into indexed
    /// columns before arrays are serialized as JSON strings
    pub max_array_depth: usize,

    /// How many top-level elements `infer_schema` samples
    pub schema_sample_size: usize,
}

impl Default for FlattenConfig {
    fn default() -> Self {
        FlattenConfig {
            max_array_depth: 1,
            schema_sample_size: 50,
        }
    }
}

/// Compose a dot-notation column key.
pub(crate) fn join_key(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{prefix}.{key}")
    }
}

/// Column key for a leaf reached with no path, e.g. a bare top-level scalar.
pub(crate) fn leaf_key(prefix: &str) -> String {
    if prefix.is_empty() {
        String::from("value")
    } else {
        prefix.to_string()
    }
}

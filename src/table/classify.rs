use serde_json::Value;

/// How many leading elements are inspected when classifying an array, so
/// classification stays O(1) regardless of array size.
pub const CLASSIFY_SAMPLE: usize = 5;

/// What an array holds, as far as the bounded sample can tell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArrayKind {
    /// Uniformly objects
    Objects,
    /// Scalars only (also the fallback for empty arrays)
    Primitives,
    /// At least one nested array in the sample
    Nested,
    /// Objects and scalars side by side
    Mixed,
}

/// Classify an array's content from its first [`CLASSIFY_SAMPLE`] elements.
///
/// Nested arrays win over everything else: expanding them into rows or
/// indexed columns would explode the schema (coordinate-pair geometries are
/// the canonical case), so a single nested array in the sample forces the
/// whole array to be serialized instead of expanded.
pub fn classify(values: &[Value]) -> ArrayKind {
    if values.is_empty() {
        return ArrayKind::Primitives;
    }

    let sample = &values[..values.len().min(CLASSIFY_SAMPLE)];

    let mut has_object = false;
    let mut has_primitive = false;
    for value in sample {
        match value {
            Value::Array(_) => return ArrayKind::Nested,
            Value::Object(_) => has_object = true,
            _ => has_primitive = true,
        }
    }

    if has_object && has_primitive {
        ArrayKind::Mixed
    } else if has_object {
        ArrayKind::Objects
    } else {
        ArrayKind::Primitives
    }
}

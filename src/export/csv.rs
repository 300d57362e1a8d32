use crate::table::types::FlatRow;
use serde_json::Value;

/// UTF-8 byte-order mark, prepended so spreadsheet applications detect the
/// encoding.
const BOM: char = '\u{FEFF}';

/// Render rows and schema as CSV text.
///
/// Fields containing a comma, quote or line break are wrapped in double
/// quotes with internal quotes doubled; `null` renders as an empty field.
/// Empty rows or an empty schema yield an empty string (no BOM).
pub fn to_csv(rows: &[FlatRow], schema: &[String]) -> String {
    if rows.is_empty() || schema.is_empty() {
        return String::new();
    }

    let mut lines = Vec::with_capacity(rows.len() + 1);
    lines.push(schema.join(","));

    for row in rows {
        let cells: Vec<String> = schema
            .iter()
            .map(|key| escape_field(&cell_text(row.get(key))))
            .collect();
        lines.push(cells.join(","));
    }

    format!("{BOM}{}", lines.join("\n"))
}

fn cell_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

fn escape_field(text: &str) -> String {
    if text.contains(',') || text.contains('"') || text.contains('\n') || text.contains('\r') {
        format!("\"{}\"", text.replace('"', "\"\""))
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::flatten::flatten;
    use serde_json::json;

    #[test]
    fn test_output_starts_with_bom() {
        let result = flatten(&json!({"a": 1}));
        let csv = to_csv(&result.rows, &result.schema);

        assert_eq!(csv.chars().next(), Some('\u{FEFF}'));
    }

    #[test]
    fn test_commas_force_quoting() {
        let result = flatten(&json!({"name": "Smith, John"}));
        let csv = to_csv(&result.rows, &result.schema);

        assert!(csv.contains("\"Smith, John\""));
    }

    #[test]
    fn test_quotes_are_doubled() {
        let result = flatten(&json!({"name": "John \"Johnny\" Doe"}));
        let csv = to_csv(&result.rows, &result.schema);

        assert!(csv.contains("\"John \"\"Johnny\"\" Doe\""));
    }

    #[test]
    fn test_null_renders_empty() {
        let result = flatten(&json!([
            {"a": 1, "b": "x"},
            {"a": 2}
        ]));
        let csv = to_csv(&result.rows, &result.schema);

        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "\u{FEFF}a,b");
        assert_eq!(lines[1], "1,x");
        assert_eq!(lines[2], "2,");
    }

    #[test]
    fn test_empty_input_yields_empty_string() {
        assert_eq!(to_csv(&[], &[]), "");
        assert_eq!(to_csv(&[], &[String::from("a")]), "");
    }
}

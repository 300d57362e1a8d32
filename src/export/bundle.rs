use crate::export::workbook::Workbook;
use crate::export::{csv, html, workbook};
use crate::table::types::FlatRow;
use serde_json::Value;

/// Every export format rendered from one conversion, ready for the caller
/// to package (zip archive, download set, project export).
#[derive(Debug, Clone)]
pub struct ExportBundle {
    pub csv: String,
    pub html: String,
    pub workbook: Workbook,
    /// Pretty-printed original document, for keeping next to the exports.
    pub source_json: String,
}

/// Compose the full bundle. Pure composition of the single-format
/// converters; no new formatting rules.
pub fn to_bundle(data: &Value, rows: &[FlatRow], schema: &[String]) -> ExportBundle {
    ExportBundle {
        csv: csv::to_csv(rows, schema),
        html: html::to_html(rows, schema),
        workbook: workbook::to_workbook(rows, schema),
        source_json: serde_json::to_string_pretty(data)
            .unwrap_or_else(|_| String::from("null")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::flatten::flatten;
    use serde_json::json;

    #[test]
    fn test_bundle_composes_all_formats() {
        let data = json!({"name": "Alice", "tags": ["a", "b"]});
        let result = flatten(&data);

        let bundle = to_bundle(&data, &result.rows, &result.schema);

        assert!(bundle.csv.contains("name"));
        assert!(bundle.html.contains("<table"));
        assert_eq!(bundle.workbook.sheets[0].rows.len(), 2);
        // Pretty-printed, not compact.
        assert!(bundle.source_json.contains("\n"));
        assert_eq!(
            serde_json::from_str::<serde_json::Value>(&bundle.source_json).unwrap(),
            data
        );
    }
}

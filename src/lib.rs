//! # Flatiron - JSON to Spreadsheet Toolkit
//!
//! A library for turning arbitrary, untrusted JSON into tabular data
//! suitable for spreadsheet export (CSV, HTML, workbook).
//!
//! ## Modules
//!
//! - **parse**: defensive parsing with auto-unescape of string-encoded JSON
//! - **table**: the transformation engine (flatten, expand, unflatten)
//! - **export**: converters from rows and schema to CSV/HTML/workbook
//!
//! ## Quick Start
//!
//! ### Table conversion
//!
//! ```rust
//! use flatiron::{convert_str, to_csv, TableMode};
//!
//! # fn main() -> Result<(), flatiron::ParseError> {
//! let result = convert_str(
//!     r#"{"sku": "X1", "variants": [{"size": "S"}, {"size": "M"}]}"#,
//!     TableMode::Expand,
//! )?;
//!
//! // One row per variant, with the parent sku repeated.
//! assert_eq!(result.rows.len(), 2);
//! assert_eq!(result.schema, vec!["sku", "size"]);
//!
//! let csv = to_csv(&result.rows, &result.schema);
//! assert!(csv.contains("sku,size"));
//! # Ok(())
//! # }
//! ```
//!
//! ### Defensive parsing
//!
//! ```rust
//! use flatiron::parse;
//!
//! // Double-encoded payloads unwrap transparently.
//! let value = parse(r#""{\"a\": 1}""#).unwrap();
//! assert_eq!(value["a"], 1);
//! ```

pub mod export;
pub mod parse;
pub mod table;

// Re-export commonly used items for convenience
pub use export::{
    to_bundle, to_csv, to_hierarchical_workbook, to_html, to_workbook, ExportBundle, Workbook,
};
pub use parse::{encoding_depth, parse, ParseError, MAX_ENCODING_DEPTH};
pub use table::{
    classify, expand_to_table, flatten, infer_schema, unflatten, ArrayKind, FlatRow,
    FlattenConfig, FlattenResult, Flattener, Schema,
};

/// Which transformation turns the parsed value into rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableMode {
    /// One row per top-level element, arrays expanded into indexed columns
    Flatten,
    /// One row per leaf array item, parent fields repeated
    Expand,
}

/// Main entry point: parse raw text and convert it into tabular rows.
pub fn convert_str(input: &str, mode: TableMode) -> Result<FlattenResult, ParseError> {
    let value = parse::parse(input)?;
    Ok(match mode {
        TableMode::Flatten => table::flatten(&value),
        TableMode::Expand => table::expand_to_table(&value),
    })
}

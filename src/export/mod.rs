//! Tabular converters - render rows and schema as CSV, HTML or an
//! in-memory spreadsheet workbook.
//!
//! All converters are pure functions over `(rows, schema)` pairs produced by
//! the [`table`](crate::table) transformations; empty input always yields a
//! defined empty-state output rather than an error.

pub mod bundle;
pub mod csv;
pub mod html;
pub mod workbook;

pub use bundle::{to_bundle, ExportBundle};
pub use csv::to_csv;
pub use html::to_html;
pub use workbook::{
    to_hierarchical_workbook, to_workbook, Cell, CellStyle, CellValue, MergeRange, Sheet, Workbook,
};

use crate::table::types::FlatRow;
use serde::Serialize;
use serde_json::Value;

/// Narrowest a column is allowed to be, in characters.
pub const MIN_COLUMN_WIDTH: usize = 10;

/// Fill color applied to header cells in the flat layout.
const HEADER_FILL: &str = "E4EBF5";

/// An in-memory spreadsheet workbook.
///
/// This is the data contract handed to the surrounding application, which
/// owns actual file serialization; the model carries everything a writer
/// needs (cells, styles, column widths, merge ranges).
#[derive(Debug, Clone, Serialize)]
pub struct Workbook {
    pub sheets: Vec<Sheet>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Sheet {
    pub name: String,
    pub rows: Vec<Vec<Cell>>,
    pub column_widths: Vec<usize>,
    pub merges: Vec<MergeRange>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Cell {
    pub value: CellValue,
    pub style: CellStyle,
}

impl Cell {
    fn plain(value: CellValue) -> Self {
        Cell {
            value,
            style: CellStyle::default(),
        }
    }

    fn header(text: String) -> Self {
        Cell {
            value: CellValue::Text(text),
            style: CellStyle {
                bold: true,
                fill: Some(HEADER_FILL.to_string()),
            },
        }
    }

    fn key(text: String) -> Self {
        Cell {
            value: CellValue::Text(text),
            style: CellStyle {
                bold: true,
                fill: None,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum CellValue {
    Empty,
    Bool(bool),
    Number(f64),
    Text(String),
}

impl CellValue {
    fn display_width(&self) -> usize {
        match self {
            CellValue::Empty => 0,
            CellValue::Bool(true) => 4,
            CellValue::Bool(false) => 5,
            CellValue::Number(n) => n.to_string().chars().count(),
            CellValue::Text(s) => s.chars().count(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CellStyle {
    pub bold: bool,
    pub fill: Option<String>,
}

/// A vertical or rectangular cell merge, inclusive on both ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MergeRange {
    pub start_row: usize,
    pub start_col: usize,
    pub end_row: usize,
    pub end_col: usize,
}

/// Build a single-sheet workbook from `[schema, ...rows]`.
///
/// Header cells are bold with a fill; each column is sized to
/// `max(header length, longest cell, MIN_COLUMN_WIDTH)`.
pub fn to_workbook(rows: &[FlatRow], schema: &[String]) -> Workbook {
    if rows.is_empty() || schema.is_empty() {
        return Workbook {
            sheets: vec![Sheet {
                name: String::from("Data"),
                rows: Vec::new(),
                column_widths: Vec::new(),
                merges: Vec::new(),
            }],
        };
    }

    let mut grid: Vec<Vec<Cell>> = Vec::with_capacity(rows.len() + 1);
    grid.push(schema.iter().map(|key| Cell::header(key.clone())).collect());
    for row in rows {
        grid.push(
            schema
                .iter()
                .map(|key| Cell::plain(scalar_cell(row.get(key))))
                .collect(),
        );
    }

    let column_widths = column_widths(&grid);

    Workbook {
        sheets: vec![Sheet {
            name: String::from("Data"),
            rows: grid,
            column_widths,
            merges: Vec::new(),
        }],
    }
}

/// Render nested JSON directly as an indented, merged-cell tree view.
///
/// Each key is written at its depth column with its value laid out in the
/// next column; whenever a subtree occupies more than one row, the key cell
/// is merged vertically across the rows the subtree consumed.
pub fn to_hierarchical_workbook(data: &Value) -> Workbook {
    let mut layout = SheetLayout {
        grid: Vec::new(),
        merges: Vec::new(),
        cursor: 0,
    };
    if !data.is_null() {
        layout.place_value(data, 0);
    }

    let column_widths = column_widths(&layout.grid);

    Workbook {
        sheets: vec![Sheet {
            name: String::from("Hierarchy"),
            rows: layout.grid,
            column_widths,
            merges: layout.merges,
        }],
    }
}

struct SheetLayout {
    grid: Vec<Vec<Cell>>,
    merges: Vec<MergeRange>,
    cursor: usize,
}

impl SheetLayout {
    fn put(&mut self, row: usize, col: usize, cell: Cell) {
        while self.grid.len() <= row {
            self.grid.push(Vec::new());
        }
        let line = &mut self.grid[row];
        while line.len() <= col {
            line.push(Cell::plain(CellValue::Empty));
        }
        line[col] = cell;
    }

    fn place_value(&mut self, value: &Value, col: usize) {
        match value {
            Value::Object(map) if !map.is_empty() => {
                for (key, child) in map {
                    let start = self.cursor;
                    self.put(start, col, Cell::key(key.clone()));
                    self.place_value(child, col + 1);

                    // Last occupied row of the subtree; a leaf never merges.
                    let end = self.cursor - 1;
                    if end > start {
                        self.merges.push(MergeRange {
                            start_row: start,
                            start_col: col,
                            end_row: end,
                            end_col: col,
                        });
                    }
                }
            }
            Value::Array(items) if !items.is_empty() => {
                for item in items {
                    self.place_value(item, col);
                }
            }
            other => {
                self.put(self.cursor, col, Cell::plain(leaf_cell(other)));
                self.cursor += 1;
            }
        }
    }
}

fn scalar_cell(value: Option<&Value>) -> CellValue {
    match value {
        None | Some(Value::Null) => CellValue::Empty,
        Some(Value::Bool(b)) => CellValue::Bool(*b),
        Some(Value::Number(n)) => CellValue::Number(n.as_f64().unwrap_or(0.0)),
        Some(Value::String(s)) => CellValue::Text(s.clone()),
        Some(other) => CellValue::Text(
            serde_json::to_string(other).unwrap_or_else(|_| String::from("null")),
        ),
    }
}

/// Cell for a leaf in the hierarchical view; empty containers render blank.
fn leaf_cell(value: &Value) -> CellValue {
    match value {
        Value::Object(_) | Value::Array(_) => CellValue::Empty,
        other => scalar_cell(Some(other)),
    }
}

fn column_widths(grid: &[Vec<Cell>]) -> Vec<usize> {
    let columns = grid.iter().map(Vec::len).max().unwrap_or(0);
    (0..columns)
        .map(|col| {
            grid.iter()
                .filter_map(|row| row.get(col))
                .map(|cell| cell.value.display_width())
                .max()
                .unwrap_or(0)
                .max(MIN_COLUMN_WIDTH)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::flatten::flatten;
    use serde_json::json;

    #[test]
    fn test_flat_workbook_has_styled_header() {
        let result = flatten(&json!({"name": "Alice", "age": 30}));
        let workbook = to_workbook(&result.rows, &result.schema);

        let sheet = &workbook.sheets[0];
        assert_eq!(sheet.rows.len(), 2);
        for cell in &sheet.rows[0] {
            assert!(cell.style.bold);
            assert!(cell.style.fill.is_some());
        }
        assert_eq!(sheet.rows[0][0].value, CellValue::Text(String::from("age")));
        assert_eq!(sheet.rows[1][0].value, CellValue::Number(30.0));
    }

    #[test]
    fn test_column_width_heuristic() {
        let result = flatten(&json!({"k": "a value much longer than the header"}));
        let workbook = to_workbook(&result.rows, &result.schema);

        let widths = &workbook.sheets[0].column_widths;
        assert_eq!(widths[0], "a value much longer than the header".len());

        let result = flatten(&json!({"k": "x"}));
        let workbook = to_workbook(&result.rows, &result.schema);
        assert_eq!(workbook.sheets[0].column_widths[0], MIN_COLUMN_WIDTH);
    }

    #[test]
    fn test_empty_input_yields_empty_sheet() {
        let workbook = to_workbook(&[], &[]);

        assert_eq!(workbook.sheets.len(), 1);
        assert!(workbook.sheets[0].rows.is_empty());
        assert!(workbook.sheets[0].merges.is_empty());
    }

    #[test]
    fn test_hierarchical_layout_and_merges() {
        let workbook = to_hierarchical_workbook(&json!({
            "user": {
                "name": "Alice",
                "roles": ["admin", "ops"]
            }
        }));

        let sheet = &workbook.sheets[0];
        assert_eq!(sheet.rows.len(), 3);

        assert_eq!(sheet.rows[0][0].value, CellValue::Text(String::from("user")));
        assert_eq!(sheet.rows[0][1].value, CellValue::Text(String::from("name")));
        assert_eq!(sheet.rows[0][2].value, CellValue::Text(String::from("Alice")));
        assert_eq!(sheet.rows[1][1].value, CellValue::Text(String::from("roles")));
        assert_eq!(sheet.rows[1][2].value, CellValue::Text(String::from("admin")));
        assert_eq!(sheet.rows[2][2].value, CellValue::Text(String::from("ops")));

        // "user" spans all three rows, "roles" spans the last two.
        assert!(sheet.merges.contains(&MergeRange {
            start_row: 0,
            start_col: 0,
            end_row: 2,
            end_col: 0
        }));
        assert!(sheet.merges.contains(&MergeRange {
            start_row: 1,
            start_col: 1,
            end_row: 2,
            end_col: 1
        }));
    }

    #[test]
    fn test_hierarchical_leaves_do_not_merge() {
        let workbook = to_hierarchical_workbook(&json!({"a": 1}));

        let sheet = &workbook.sheets[0];
        assert_eq!(sheet.rows.len(), 1);
        assert!(sheet.merges.is_empty());
    }

    #[test]
    fn test_hierarchical_scalar_root() {
        let workbook = to_hierarchical_workbook(&json!(42));

        let sheet = &workbook.sheets[0];
        assert_eq!(sheet.rows.len(), 1);
        assert_eq!(sheet.rows[0][0].value, CellValue::Number(42.0));
        assert!(sheet.merges.is_empty());
    }
}

//! Core data model: cells, column types, and the working [`Table`].
//!
//! A [`Table`] is the canonical in-memory dataset: ordered column names, rows
//! of positionally aligned [`Cell`]s, and a derived [`ColumnType`] per column.
//! Pipeline transforms mutate one owned `Table` in place; the step log (see
//! [`crate::pipeline`]) is the durable record of how the current table was
//! derived from the original upload.

use serde::{Deserialize, Serialize};

/// A single cell in a [`Table`].
///
/// Cells are a loose union of what survives raw-text coercion: a finite
/// number, a non-empty trimmed string, or nothing. `NaN` never enters a
/// `Number`; a non-finite numeric parse is kept as `Text`.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    /// A finite 64-bit float.
    Number(f64),
    /// A trimmed, non-empty UTF-8 string.
    Text(String),
    /// Missing value (empty / null / undefined in the raw input).
    Missing,
}

impl Cell {
    /// Returns `true` for [`Cell::Missing`].
    pub fn is_missing(&self) -> bool {
        matches!(self, Cell::Missing)
    }

    /// The numeric payload, if this cell holds one.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Cell::Number(v) => Some(*v),
            _ => None,
        }
    }

    /// The text payload, if this cell holds one.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Cell::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }
}

impl From<&Cell> for serde_json::Value {
    fn from(cell: &Cell) -> Self {
        match cell {
            Cell::Number(v) => serde_json::Number::from_f64(*v)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Cell::Text(s) => serde_json::Value::String(s.clone()),
            Cell::Missing => serde_json::Value::Null,
        }
    }
}

/// Derived classification of a column, based on the cell variants present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnType {
    /// Every non-missing cell is a number.
    Numeric,
    /// Every non-missing cell is a string.
    Categorical,
    /// Both numbers and strings are present.
    Mixed,
}

/// Classify a column from its cells: all non-missing numbers → `Numeric`,
/// all non-missing strings → `Categorical`, otherwise `Mixed`.
///
/// A column with no non-missing cells classifies as `Numeric` (the
/// all-numbers check holds vacuously).
pub fn infer_column_type<'a>(cells: impl Iterator<Item = &'a Cell>) -> ColumnType {
    let mut saw_number = false;
    let mut saw_text = false;
    for cell in cells {
        match cell {
            Cell::Number(_) => saw_number = true,
            Cell::Text(_) => saw_text = true,
            Cell::Missing => {}
        }
    }
    match (saw_number, saw_text) {
        (_, false) => ColumnType::Numeric,
        (false, true) => ColumnType::Categorical,
        (true, true) => ColumnType::Mixed,
    }
}

/// In-memory tabular working dataset.
///
/// Invariant: `rows[i].len() == columns.len() == types.len()` for every row,
/// at all times. Any operation that changes `columns` must rewrite `types`
/// and every row in the same pass.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    /// Ordered, unique column names; order defines row layout.
    pub columns: Vec<String>,
    /// Derived column types, parallel to `columns`.
    pub types: Vec<ColumnType>,
    /// Row-major cell storage, each row aligned with `columns`.
    pub rows: Vec<Vec<Cell>>,
}

impl Table {
    /// Create a table from columns and rows, deriving `types` from the data.
    ///
    /// # Panics
    ///
    /// Panics if any row's length differs from the column count.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Cell>>) -> Self {
        for (i, row) in rows.iter().enumerate() {
            assert!(
                row.len() == columns.len(),
                "row {} length {} does not match column count {}",
                i,
                row.len(),
                columns.len()
            );
        }
        let mut table = Self {
            types: Vec::with_capacity(columns.len()),
            columns,
            rows,
        };
        table.refresh_types();
        table
    }

    /// Number of columns.
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    /// Number of rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Returns the index of a column by name, if present.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// The derived type of the named column, if present.
    pub fn column_type(&self, name: &str) -> Option<ColumnType> {
        self.column_index(name).map(|i| self.types[i])
    }

    /// Re-derive all column types from the current cells.
    ///
    /// Called after ingestion and after every schema-affecting transform.
    pub fn refresh_types(&mut self) {
        self.types = (0..self.columns.len())
            .map(|i| infer_column_type(self.rows.iter().map(|r| &r[i])))
            .collect();
    }

    /// Non-missing numeric values of the column at `idx`, in row order.
    pub fn numeric_values(&self, idx: usize) -> Vec<f64> {
        self.rows
            .iter()
            .filter_map(|row| row[idx].as_number())
            .collect()
    }

    /// Names of all columns currently classified as numeric.
    pub fn numeric_column_names(&self) -> Vec<String> {
        self.columns
            .iter()
            .zip(self.types.iter())
            .filter(|(_, t)| **t == ColumnType::Numeric)
            .map(|(c, _)| c.clone())
            .collect()
    }

    /// Checks the row/column/type alignment invariant.
    pub fn is_consistent(&self) -> bool {
        self.types.len() == self.columns.len()
            && self.rows.iter().all(|r| r.len() == self.columns.len())
    }
}

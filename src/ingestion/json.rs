//! JSON ingestion and export.
//!
//! The supported tabular payload is a JSON array of objects:
//! `[{"a": 1}, {"a": 2}]`. Column names and their order come from the first
//! element's keys; later objects are read positionally against that schema
//! (a missing key contributes a missing cell). Any other payload shape is
//! not entered into the tabular pipeline and is rejected.

use std::fs;
use std::path::Path;

use crate::error::{PrepError, PrepResult};
use crate::types::{Cell, Table};

use super::csv::coerce_cell;
use super::finalize_rows;

/// Ingest a JSON file into an in-memory [`Table`].
pub fn ingest_json_from_path(path: impl AsRef<Path>) -> PrepResult<Table> {
    let text = fs::read_to_string(path)?;
    parse_json_str(&text)
}

/// Parse raw JSON text into a [`Table`].
pub fn parse_json_str(input: &str) -> PrepResult<Table> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(PrepError::malformed("json input is empty"));
    }
    let value: serde_json::Value = serde_json::from_str(trimmed)?;
    table_from_json(&value)
}

/// Build a [`Table`] from an already-parsed JSON value.
pub fn table_from_json(value: &serde_json::Value) -> PrepResult<Table> {
    let items = value.as_array().ok_or_else(|| {
        PrepError::malformed("json payload is not an array of objects")
    })?;
    if items.is_empty() {
        return Err(PrepError::empty("json array has no elements"));
    }

    let first = items[0]
        .as_object()
        .ok_or_else(|| PrepError::malformed("row 1 is not a json object"))?;
    let columns: Vec<String> = first.keys().cloned().collect();

    let mut rows: Vec<Vec<Cell>> = Vec::with_capacity(items.len());
    for (idx0, item) in items.iter().enumerate() {
        let row_num = idx0 + 1;
        let obj = item
            .as_object()
            .ok_or_else(|| PrepError::malformed(format!("row {row_num} is not a json object")))?;
        rows.push(
            columns
                .iter()
                .map(|name| obj.get(name).map(coerce_json_value).unwrap_or(Cell::Missing))
                .collect(),
        );
    }

    let rows = finalize_rows(rows)?;
    Ok(Table::new(columns, rows))
}

/// Coerce one JSON value into a [`Cell`].
///
/// Strings go through the same text coercion as CSV cells, so `"null"` or a
/// numeric string behave identically across formats. Booleans and nested
/// values have no dedicated cell variant and ingest as text.
fn coerce_json_value(value: &serde_json::Value) -> Cell {
    match value {
        serde_json::Value::Null => Cell::Missing,
        serde_json::Value::Number(n) => match n.as_f64() {
            Some(v) if v.is_finite() => Cell::Number(v),
            _ => Cell::Missing,
        },
        serde_json::Value::String(s) => coerce_cell(s),
        serde_json::Value::Bool(b) => Cell::Text(b.to_string()),
        other => Cell::Text(other.to_string()),
    }
}

/// Serialize the table to a JSON array of objects (the inverse of
/// [`parse_json_str`]). Missing cells become JSON `null`.
pub fn write_json(table: &Table) -> PrepResult<String> {
    let items: Vec<serde_json::Value> = table
        .rows
        .iter()
        .map(|row| {
            let mut obj = serde_json::Map::with_capacity(table.columns.len());
            for (name, cell) in table.columns.iter().zip(row.iter()) {
                obj.insert(name.clone(), cell.into());
            }
            serde_json::Value::Object(obj)
        })
        .collect();
    Ok(serde_json::to_string(&items)?)
}

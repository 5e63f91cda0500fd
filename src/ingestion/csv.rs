//! CSV ingestion and export.
//!
//! Rules:
//!
//! - The first line is the header row; at least one data row must follow.
//! - At least 2 header columns, none empty, no duplicates.
//! - Every data row must have exactly as many cells as the header
//!   (violations are reported with a 1-based row number counting the header
//!   as row 1).
//! - Cell coercion: trim; `"" | "null" | "undefined"` become missing; a
//!   whole-string finite number becomes numeric; anything else stays text.
//! - Rows that are entirely missing are dropped; ingestion fails if no rows
//!   remain.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use crate::error::{PrepError, PrepResult};
use crate::types::{Cell, Table};

use super::finalize_rows;

/// Ingest a CSV file into an in-memory [`Table`].
pub fn ingest_csv_from_path(path: impl AsRef<Path>) -> PrepResult<Table> {
    let text = fs::read_to_string(path)?;
    parse_csv_str(&text)
}

/// Parse raw CSV text into a [`Table`], inferring per-column types.
pub fn parse_csv_str(input: &str) -> PrepResult<Table> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(PrepError::malformed("csv input is empty"));
    }
    if trimmed.lines().filter(|l| !l.trim().is_empty()).count() < 2 {
        return Err(PrepError::malformed(
            "csv input needs a header row and at least one data row",
        ));
    }

    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(trimmed.as_bytes());

    let headers = rdr.headers()?.clone();
    let columns = validate_headers(&headers)?;

    let mut rows: Vec<Vec<Cell>> = Vec::new();
    for (row_idx0, result) in rdr.records().enumerate() {
        // Report 1-based row numbers for users; +1 again because the header
        // is row 1.
        let user_row = row_idx0 + 2;
        let record = result?;
        if record.len() != columns.len() {
            return Err(PrepError::malformed(format!(
                "row {user_row}: expected {} cells, got {}",
                columns.len(),
                record.len()
            )));
        }
        rows.push(record.iter().map(coerce_cell).collect());
    }

    let rows = finalize_rows(rows)?;
    Ok(Table::new(columns, rows))
}

fn validate_headers(headers: &csv::StringRecord) -> PrepResult<Vec<String>> {
    if headers.len() < 2 {
        return Err(PrepError::malformed(format!(
            "expected at least 2 columns, got {}",
            headers.len()
        )));
    }

    let mut columns = Vec::with_capacity(headers.len());
    let mut seen: HashSet<&str> = HashSet::new();
    for (i, raw) in headers.iter().enumerate() {
        let name = raw.trim();
        if name.is_empty() {
            return Err(PrepError::malformed(format!("header {} is empty", i + 1)));
        }
        if !seen.insert(name) {
            return Err(PrepError::malformed(format!(
                "duplicate column name '{name}'"
            )));
        }
        columns.push(name.to_string());
    }
    Ok(columns)
}

/// Coerce one raw string cell into a [`Cell`].
///
/// `NaN`/`inf` parses are not finite and therefore stay text.
pub(crate) fn coerce_cell(raw: &str) -> Cell {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" || trimmed == "undefined" {
        return Cell::Missing;
    }
    match trimmed.parse::<f64>() {
        Ok(v) if v.is_finite() => Cell::Number(v),
        _ => Cell::Text(trimmed.to_string()),
    }
}

/// Serialize the table back to CSV text (the inverse of [`parse_csv_str`]).
///
/// Missing cells become empty fields; string cells containing commas (or
/// quotes/newlines) are quoted by the writer.
pub fn write_csv(table: &Table) -> PrepResult<String> {
    let mut wtr = csv::Writer::from_writer(Vec::new());
    wtr.write_record(&table.columns)?;
    for row in &table.rows {
        wtr.write_record(row.iter().map(|cell| match cell {
            Cell::Number(v) => v.to_string(),
            Cell::Text(s) => s.clone(),
            Cell::Missing => String::new(),
        }))?;
    }
    let bytes = wtr
        .into_inner()
        .map_err(|e| PrepError::malformed(format!("csv writer flush failed: {e}")))?;
    String::from_utf8(bytes).map_err(|e| PrepError::malformed(format!("csv output not utf-8: {e}")))
}

#[cfg(test)]
mod tests {
    use super::{coerce_cell, parse_csv_str, write_csv};
    use crate::error::PrepError;
    use crate::types::{Cell, ColumnType};

    #[test]
    fn coerce_maps_sentinels_to_missing() {
        assert_eq!(coerce_cell("  "), Cell::Missing);
        assert_eq!(coerce_cell("null"), Cell::Missing);
        assert_eq!(coerce_cell("undefined"), Cell::Missing);
        assert_eq!(coerce_cell(" 25 "), Cell::Number(25.0));
        assert_eq!(coerce_cell("2.5e3"), Cell::Number(2500.0));
        assert_eq!(coerce_cell("NaN"), Cell::Text("NaN".to_string()));
        assert_eq!(coerce_cell("inf"), Cell::Text("inf".to_string()));
        assert_eq!(coerce_cell(" John "), Cell::Text("John".to_string()));
    }

    #[test]
    fn parse_infers_types_and_drops_all_missing_rows() {
        let table = parse_csv_str("name,age\nJohn,25\n,\nBob,35\n").unwrap();
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.types, vec![ColumnType::Categorical, ColumnType::Numeric]);
    }

    #[test]
    fn parse_rejects_degenerate_inputs() {
        assert!(matches!(
            parse_csv_str("   "),
            Err(PrepError::MalformedInput { .. })
        ));
        assert!(matches!(
            parse_csv_str("name,age\n"),
            Err(PrepError::MalformedInput { .. })
        ));
        assert!(matches!(
            parse_csv_str("name\nJohn\n"),
            Err(PrepError::MalformedInput { .. })
        ));
        assert!(matches!(
            parse_csv_str("name, \nJohn,25\n"),
            Err(PrepError::MalformedInput { .. })
        ));
        assert!(matches!(
            parse_csv_str("a,a\n1,2\n"),
            Err(PrepError::MalformedInput { .. })
        ));
    }

    #[test]
    fn parse_reports_ragged_row_with_user_row_number() {
        let err = parse_csv_str("name,age\nJohn,25\nJane,30,extra\n").unwrap_err();
        assert!(err.to_string().contains("row 3"), "{err}");
    }

    #[test]
    fn parse_fails_when_only_all_missing_rows_remain() {
        assert!(matches!(
            parse_csv_str("a,b\nnull,\nundefined,null\n"),
            Err(PrepError::EmptyDataset { .. })
        ));
    }

    #[test]
    fn write_quotes_cells_containing_commas() {
        let table = parse_csv_str("name,age\n\"Doe, John\",25\n").unwrap();
        let out = write_csv(&table).unwrap();
        assert!(out.contains("\"Doe, John\""), "{out}");
    }

    #[test]
    fn round_trip_preserves_columns_and_cells() {
        let table = parse_csv_str("name,age\nJohn,25\nJane,\nBob,35\n").unwrap();
        let reparsed = parse_csv_str(&write_csv(&table).unwrap()).unwrap();
        assert_eq!(reparsed.columns, table.columns);
        assert_eq!(reparsed.rows, table.rows);
        assert_eq!(reparsed.types, table.types);
    }
}

//! Missing-value imputation.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{PrepError, PrepResult};
use crate::stats::{mean, quantile_sorted};
use crate::types::{Cell, ColumnType, Table};

use super::resolve_targets;

/// How to fill or remove missing values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingStrategy {
    /// Remove every row with at least one missing cell.
    DropRows,
    /// Remove every column with at least one missing cell.
    DropColumns,
    /// Fill with the column mean (numeric columns; others fall back to mode).
    Mean,
    /// Fill with the column median (numeric columns; others fall back to mode).
    Median,
    /// Fill with the most frequent value.
    Mode,
    /// Fill with the nearest earlier non-missing value in row order.
    ForwardFill,
    /// Fill with the nearest later non-missing value in row order.
    BackwardFill,
}

/// Parameters recorded for a `handle_missing` step.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HandleMissingParams {
    pub strategy: MissingStrategy,
    pub target_columns: Option<Vec<String>>,
}

/// Apply `strategy` to the table.
///
/// For the statistic strategies, a column whose statistic cannot be computed
/// (e.g. mean of an all-missing column) is left untouched rather than
/// failing the operation. `target_columns` limits the statistic and fill
/// strategies to the named columns; the row/column-dropping strategies always
/// consider the whole table.
pub fn handle_missing_values(
    table: &mut Table,
    strategy: MissingStrategy,
    target_columns: Option<&[&str]>,
) -> PrepResult<()> {
    match strategy {
        MissingStrategy::DropRows => drop_rows(table),
        MissingStrategy::DropColumns => {
            drop_columns(table);
            Ok(())
        }
        MissingStrategy::Mean | MissingStrategy::Median | MissingStrategy::Mode => {
            let targets = resolve_targets(table, target_columns)?;
            for idx in targets {
                if let Some(fill) = statistic_fill(table, idx, strategy) {
                    for row in &mut table.rows {
                        if row[idx].is_missing() {
                            row[idx] = fill.clone();
                        }
                    }
                }
            }
            Ok(())
        }
        MissingStrategy::ForwardFill => {
            let targets = resolve_targets(table, target_columns)?;
            for idx in targets {
                let mut last: Option<Cell> = None;
                for row in &mut table.rows {
                    if row[idx].is_missing() {
                        if let Some(fill) = &last {
                            row[idx] = fill.clone();
                        }
                    } else {
                        last = Some(row[idx].clone());
                    }
                }
            }
            Ok(())
        }
        MissingStrategy::BackwardFill => {
            let targets = resolve_targets(table, target_columns)?;
            for idx in targets {
                let mut next: Option<Cell> = None;
                for row in table.rows.iter_mut().rev() {
                    if row[idx].is_missing() {
                        if let Some(fill) = &next {
                            row[idx] = fill.clone();
                        }
                    } else {
                        next = Some(row[idx].clone());
                    }
                }
            }
            Ok(())
        }
    }
}

fn drop_rows(table: &mut Table) -> PrepResult<()> {
    table.rows.retain(|row| !row.iter().any(Cell::is_missing));
    if table.rows.is_empty() {
        return Err(PrepError::empty("no rows remain after drop_rows"));
    }
    Ok(())
}

fn drop_columns(table: &mut Table) {
    let keep: Vec<bool> = (0..table.width())
        .map(|idx| !table.rows.iter().any(|row| row[idx].is_missing()))
        .collect();

    // Schema and every row are rewritten in the same pass.
    let filter_in_place = |cells: &mut Vec<Cell>| {
        let mut i = 0;
        cells.retain(|_| {
            let k = keep[i];
            i += 1;
            k
        });
    };
    for row in &mut table.rows {
        filter_in_place(row);
    }
    let mut i = 0;
    table.columns.retain(|_| {
        let k = keep[i];
        i += 1;
        k
    });
    table.refresh_types();
}

/// The replacement cell for one column, or `None` when no statistic can be
/// computed (all cells missing).
fn statistic_fill(table: &Table, idx: usize, strategy: MissingStrategy) -> Option<Cell> {
    // Categorical and mixed columns always use mode, whatever was requested.
    if table.types[idx] == ColumnType::Numeric && strategy != MissingStrategy::Mode {
        let values = table.numeric_values(idx);
        if values.is_empty() {
            return None;
        }
        let fill = match strategy {
            MissingStrategy::Mean => mean(&values),
            MissingStrategy::Median => {
                let mut sorted = values;
                sorted.sort_by(|a, b| a.partial_cmp(b).expect("finite cells"));
                quantile_sorted(&sorted, 0.5)
            }
            _ => unreachable!("non-statistic strategy handled earlier"),
        };
        return Some(Cell::Number(fill));
    }
    mode_cell(table, idx)
}

/// Most frequent non-missing cell; first-seen wins ties.
fn mode_cell(table: &Table, idx: usize) -> Option<Cell> {
    let mut counts: HashMap<String, (usize, usize)> = HashMap::new();
    for (row_idx, row) in table.rows.iter().enumerate() {
        let key = match &row[idx] {
            Cell::Number(v) => format!("n:{}", v.to_bits()),
            Cell::Text(s) => format!("t:{s}"),
            Cell::Missing => continue,
        };
        let entry = counts.entry(key).or_insert((0, row_idx));
        entry.0 += 1;
    }
    counts
        .into_iter()
        .max_by(|(_, (ca, fa)), (_, (cb, fb))| ca.cmp(cb).then(fb.cmp(fa)))
        .map(|(_, (_, first_row))| table.rows[first_row][idx].clone())
}

#[cfg(test)]
mod tests {
    use super::{handle_missing_values, MissingStrategy};
    use crate::error::PrepError;
    use crate::ingestion::csv::parse_csv_str;
    use crate::types::{Cell, ColumnType};

    #[test]
    fn mean_fills_only_missing_cells() {
        let mut table = parse_csv_str("name,age\nJohn,25\nJane,\nBob,35\n").unwrap();
        handle_missing_values(&mut table, MissingStrategy::Mean, None).unwrap();
        assert_eq!(table.rows[1][1], Cell::Number(30.0));
        assert_eq!(table.rows[0][1], Cell::Number(25.0));
        assert!(table.is_consistent());
    }

    #[test]
    fn median_uses_sorted_floor_indexing() {
        let mut table = parse_csv_str("a,b\n1,x\n2,x\n4,x\n100,x\n,x\n").unwrap();
        handle_missing_values(&mut table, MissingStrategy::Median, None).unwrap();
        // sorted [1,2,4,100], floor(0.5 * 3) = idx 1 -> 2
        assert_eq!(table.rows[4][0], Cell::Number(2.0));
    }

    #[test]
    fn categorical_columns_fall_back_to_mode() {
        let mut table = parse_csv_str("color,n\nred,1\nblue,2\nred,3\n,4\n").unwrap();
        handle_missing_values(&mut table, MissingStrategy::Mean, None).unwrap();
        assert_eq!(table.rows[3][0], Cell::Text("red".to_string()));
    }

    #[test]
    fn mode_tie_breaks_on_first_seen() {
        let mut table = parse_csv_str("color,n\nblue,1\nred,2\nred,3\nblue,4\n,5\n").unwrap();
        handle_missing_values(&mut table, MissingStrategy::Mode, None).unwrap();
        assert_eq!(table.rows[4][0], Cell::Text("blue".to_string()));
    }

    #[test]
    fn all_missing_column_degrades_gracefully() {
        let mut table = parse_csv_str("a,b\n,1\n,2\n").unwrap();
        handle_missing_values(&mut table, MissingStrategy::Mean, None).unwrap();
        assert_eq!(table.rows[0][0], Cell::Missing);
        assert_eq!(table.rows[1][0], Cell::Missing);
    }

    #[test]
    fn target_columns_limits_filling() {
        let mut table = parse_csv_str("a,b\n1,\n,4\n3,6\n").unwrap();
        handle_missing_values(&mut table, MissingStrategy::Mean, Some(&["b"])).unwrap();
        assert_eq!(table.rows[1][0], Cell::Missing);
        assert_eq!(table.rows[0][1], Cell::Number(5.0));
    }

    #[test]
    fn unknown_target_column_is_a_configuration_error() {
        let mut table = parse_csv_str("a,b\n1,2\n").unwrap();
        let err =
            handle_missing_values(&mut table, MissingStrategy::Mean, Some(&["nope"])).unwrap_err();
        assert!(matches!(err, PrepError::Configuration { .. }));
    }

    #[test]
    fn drop_rows_removes_incomplete_rows_and_can_empty_out() {
        let mut table = parse_csv_str("a,b\n1,2\n3,\n5,6\n").unwrap();
        handle_missing_values(&mut table, MissingStrategy::DropRows, None).unwrap();
        assert_eq!(table.row_count(), 2);

        let mut table = parse_csv_str("a,b\n1,\n,2\n").unwrap();
        let err = handle_missing_values(&mut table, MissingStrategy::DropRows, None).unwrap_err();
        assert!(matches!(err, PrepError::EmptyDataset { .. }));
    }

    #[test]
    fn drop_columns_rewrites_schema_and_rows_together() {
        let mut table = parse_csv_str("a,b,c\n1,,x\n2,5,y\n").unwrap();
        handle_missing_values(&mut table, MissingStrategy::DropColumns, None).unwrap();
        assert_eq!(table.columns, vec!["a", "c"]);
        assert_eq!(table.types, vec![ColumnType::Numeric, ColumnType::Categorical]);
        assert!(table.is_consistent());
        assert_eq!(table.rows[0], vec![Cell::Number(1.0), Cell::Text("x".to_string())]);
    }

    #[test]
    fn forward_fill_leaves_leading_gap_missing() {
        let mut table = parse_csv_str("a,b\n,1\n2,2\n,3\n").unwrap();
        handle_missing_values(&mut table, MissingStrategy::ForwardFill, None).unwrap();
        assert_eq!(table.rows[0][0], Cell::Missing);
        assert_eq!(table.rows[2][0], Cell::Number(2.0));
    }

    #[test]
    fn backward_fill_leaves_trailing_gap_missing() {
        let mut table = parse_csv_str("a,b\n,1\n2,2\n,3\n").unwrap();
        handle_missing_values(&mut table, MissingStrategy::BackwardFill, None).unwrap();
        assert_eq!(table.rows[0][0], Cell::Number(2.0));
        assert_eq!(table.rows[2][0], Cell::Missing);
    }
}

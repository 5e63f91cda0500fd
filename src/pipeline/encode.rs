//! Categorical encoding: one-hot, label, and smoothed target encoding.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::error::{PrepError, PrepResult};
use crate::types::{Cell, ColumnType, Table};

use super::resolve_targets;

/// Encoding method for categorical columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EncodeMethod {
    /// Expand each category into a 0/1 indicator column.
    Onehot,
    /// Map categories to integer codes in first-seen order.
    Label,
    /// Replace categories with their smoothed mean of a numeric target.
    Target,
}

/// Smoothing count for target encoding: category means are blended with the
/// global mean using weight `count / (count + SMOOTHING)`.
const SMOOTHING: f64 = 10.0;

/// Parameters recorded for an `encode_categorical` step.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncodeParams {
    pub method: EncodeMethod,
    pub target_columns: Option<Vec<String>>,
    pub target_column: Option<String>,
}

/// Encode the targeted categorical columns in place.
///
/// Columns that are not categorical are passed over; `target` requires
/// `target_column` to name an existing column. Missing cells stay missing
/// under `label`/`target` and produce all-zero indicators under `onehot`.
pub fn encode_categorical(
    table: &mut Table,
    method: EncodeMethod,
    target_columns: Option<&[&str]>,
    target_column: Option<&str>,
) -> PrepResult<()> {
    let targets: Vec<usize> = resolve_targets(table, target_columns)?
        .into_iter()
        .filter(|&idx| table.types[idx] == ColumnType::Categorical)
        .collect();

    match method {
        EncodeMethod::Onehot => one_hot(table, &targets),
        EncodeMethod::Label => {
            for &idx in &targets {
                let codes: HashMap<String, f64> = distinct_values(table, idx)
                    .into_iter()
                    .enumerate()
                    .map(|(code, value)| (value, code as f64))
                    .collect();
                for row in &mut table.rows {
                    let code = row[idx].as_text().map(|s| codes[s]);
                    if let Some(code) = code {
                        row[idx] = Cell::Number(code);
                    }
                }
            }
            table.refresh_types();
            Ok(())
        }
        EncodeMethod::Target => {
            let label_name = target_column.ok_or_else(|| {
                PrepError::config("target encoding requires a target column")
            })?;
            let label_idx = table.column_index(label_name).ok_or_else(|| {
                PrepError::config(format!("target column '{label_name}' not found"))
            })?;

            for &idx in &targets {
                if idx == label_idx {
                    continue;
                }
                let blended = blended_means(table, idx, label_idx);
                for row in &mut table.rows {
                    let encoded = row[idx].as_text().map(|s| blended[s]);
                    if let Some(encoded) = encoded {
                        row[idx] = Cell::Number(encoded);
                    }
                }
            }
            table.refresh_types();
            Ok(())
        }
    }
}

/// Distinct non-missing text values of a column, in first-seen order.
fn distinct_values(table: &Table, idx: usize) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for row in &table.rows {
        if let Cell::Text(s) = &row[idx] {
            if seen.insert(s.as_str()) {
                out.push(s.clone());
            }
        }
    }
    out
}

/// Per-category smoothed target means: `w * local + (1 - w) * global` with
/// `w = count / (count + 10)`, where counts/means consider only rows whose
/// target cell is numeric.
fn blended_means(table: &Table, idx: usize, label_idx: usize) -> HashMap<String, f64> {
    let mut sums: HashMap<&str, (f64, f64)> = HashMap::new();
    let mut global_sum = 0.0;
    let mut global_count = 0.0;

    for row in &table.rows {
        let Some(y) = row[label_idx].as_number() else {
            continue;
        };
        global_sum += y;
        global_count += 1.0;
        if let Cell::Text(s) = &row[idx] {
            let entry = sums.entry(s.as_str()).or_insert((0.0, 0.0));
            entry.0 += y;
            entry.1 += 1.0;
        }
    }
    let global_mean = if global_count > 0.0 {
        global_sum / global_count
    } else {
        0.0
    };

    distinct_values(table, idx)
        .into_iter()
        .map(|value| {
            let (sum, count) = sums.get(value.as_str()).copied().unwrap_or((0.0, 0.0));
            let local_mean = if count > 0.0 { sum / count } else { 0.0 };
            let weight = count / (count + SMOOTHING);
            (value, weight * local_mean + (1.0 - weight) * global_mean)
        })
        .collect()
}

/// Rebuild the schema with each targeted column expanded into one indicator
/// column per distinct value, at the column's original position. Schema and
/// rows are rewritten from the same snapshot in a single pass.
fn one_hot(table: &mut Table, targets: &[usize]) -> PrepResult<()> {
    if targets.is_empty() {
        return Ok(());
    }
    let target_set: HashSet<usize> = targets.iter().copied().collect();

    enum Plan {
        Pass,
        Expand(Vec<String>),
    }
    let plans: Vec<Plan> = (0..table.width())
        .map(|idx| {
            if target_set.contains(&idx) {
                Plan::Expand(distinct_values(table, idx))
            } else {
                Plan::Pass
            }
        })
        .collect();

    let mut new_columns: Vec<String> = Vec::new();
    for (idx, plan) in plans.iter().enumerate() {
        match plan {
            Plan::Pass => new_columns.push(table.columns[idx].clone()),
            Plan::Expand(values) => {
                for value in values {
                    new_columns.push(format!("{}_{}", table.columns[idx], value));
                }
            }
        }
    }

    let mut seen = HashSet::new();
    for name in &new_columns {
        if !seen.insert(name.as_str()) {
            return Err(PrepError::config(format!(
                "one-hot encoding produces duplicate column name '{name}'"
            )));
        }
    }

    let new_rows: Vec<Vec<Cell>> = table
        .rows
        .iter()
        .map(|row| {
            let mut out = Vec::with_capacity(new_columns.len());
            for (idx, plan) in plans.iter().enumerate() {
                match plan {
                    Plan::Pass => out.push(row[idx].clone()),
                    Plan::Expand(values) => {
                        let current = row[idx].as_text();
                        for value in values {
                            let hit = current == Some(value.as_str());
                            out.push(Cell::Number(if hit { 1.0 } else { 0.0 }));
                        }
                    }
                }
            }
            out
        })
        .collect();

    table.columns = new_columns;
    table.rows = new_rows;
    table.refresh_types();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{encode_categorical, EncodeMethod};
    use crate::error::PrepError;
    use crate::ingestion::csv::parse_csv_str;
    use crate::types::{Cell, ColumnType};

    #[test]
    fn label_encoding_uses_first_seen_order() {
        let mut table = parse_csv_str("color,n\nred,1\nblue,2\nred,3\n").unwrap();
        encode_categorical(&mut table, EncodeMethod::Label, None, None).unwrap();
        let codes: Vec<f64> = table.rows.iter().map(|r| r[0].as_number().unwrap()).collect();
        assert_eq!(codes, vec![0.0, 1.0, 0.0]);
        assert_eq!(table.types[0], ColumnType::Numeric);
    }

    #[test]
    fn label_encoding_leaves_missing_cells() {
        let mut table = parse_csv_str("color,n\nred,1\n,2\nblue,3\n").unwrap();
        encode_categorical(&mut table, EncodeMethod::Label, None, None).unwrap();
        assert_eq!(table.rows[1][0], Cell::Missing);
    }

    #[test]
    fn one_hot_expands_at_original_position() {
        let mut table = parse_csv_str("a,color,b\n1,red,x\n2,blue,y\n3,red,z\n").unwrap();
        encode_categorical(&mut table, EncodeMethod::Onehot, Some(&["color"]), None).unwrap();
        assert_eq!(table.columns, vec!["a", "color_red", "color_blue", "b"]);
        assert!(table.is_consistent());
        assert_eq!(
            table.rows[1][1..3],
            [Cell::Number(0.0), Cell::Number(1.0)]
        );
        assert_eq!(table.types[1], ColumnType::Numeric);
    }

    #[test]
    fn one_hot_cardinality_grows_by_k_minus_one() {
        let mut table = parse_csv_str("color,n\nred,1\nblue,2\ngreen,3\nred,4\n").unwrap();
        let before = table.width();
        encode_categorical(&mut table, EncodeMethod::Onehot, None, None).unwrap();
        assert_eq!(table.width(), before + 3 - 1);
        for row in &table.rows {
            let ones = row[..3]
                .iter()
                .filter(|c| c.as_number() == Some(1.0))
                .count();
            assert_eq!(ones, 1);
        }
    }

    #[test]
    fn one_hot_missing_value_yields_all_zero_indicators() {
        let mut table = parse_csv_str("color,n\nred,1\n,2\nblue,3\n").unwrap();
        encode_categorical(&mut table, EncodeMethod::Onehot, Some(&["color"]), None).unwrap();
        assert_eq!(
            table.rows[1][..2],
            [Cell::Number(0.0), Cell::Number(0.0)]
        );
    }

    #[test]
    fn one_hot_rejects_colliding_generated_names() {
        // "c" expands to c_x, colliding with the existing c_x column.
        let mut table = parse_csv_str("c,c_x\nx,1\ny,2\n").unwrap();
        let err =
            encode_categorical(&mut table, EncodeMethod::Onehot, Some(&["c"]), None).unwrap_err();
        assert!(matches!(err, PrepError::Configuration { .. }));
    }

    #[test]
    fn target_encoding_blends_with_global_mean() {
        let mut table = parse_csv_str("color,y\nred,10\nred,20\nblue,40\n").unwrap();
        encode_categorical(
            &mut table,
            EncodeMethod::Target,
            Some(&["color"]),
            Some("y"),
        )
        .unwrap();
        // global mean 70/3; red: w=2/12, local 15; blue: w=1/11, local 40
        let global = 70.0 / 3.0;
        let red = (2.0 / 12.0) * 15.0 + (10.0 / 12.0) * global;
        let blue = (1.0 / 11.0) * 40.0 + (10.0 / 11.0) * global;
        assert!((table.rows[0][0].as_number().unwrap() - red).abs() < 1e-12);
        assert!((table.rows[2][0].as_number().unwrap() - blue).abs() < 1e-12);
        assert_eq!(table.types[0], ColumnType::Numeric);
    }

    #[test]
    fn target_encoding_requires_a_valid_target_column() {
        let mut table = parse_csv_str("color,y\nred,1\nblue,2\n").unwrap();
        assert!(matches!(
            encode_categorical(&mut table, EncodeMethod::Target, None, None),
            Err(PrepError::Configuration { .. })
        ));
        assert!(matches!(
            encode_categorical(&mut table, EncodeMethod::Target, None, Some("nope")),
            Err(PrepError::Configuration { .. })
        ));
    }
}

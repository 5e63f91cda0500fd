//! Descriptive statistics over the current [`Table`].
//!
//! Everything here is read-only: no function in this module mutates the table
//! or appends to the pipeline step log. The numeric kernels (mean, population
//! std, sorted-array quantiles, Pearson) are also what the scaler and outlier
//! clipper build on.

use std::collections::HashSet;

use rayon::prelude::*;
use serde::Serialize;

use crate::types::{Cell, ColumnType, Table};

/// Arithmetic mean. Returns 0 for an empty slice.
pub(crate) fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation (divisor `n`). Returns 0 for an empty slice.
pub(crate) fn population_std(values: &[f64], mean: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let var = values.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / values.len() as f64;
    var.sqrt()
}

/// Quantile by sorted-array indexing: the value at `floor(p * (n - 1))`.
///
/// `sorted` must be ascending and non-empty.
pub(crate) fn quantile_sorted(sorted: &[f64], p: f64) -> f64 {
    debug_assert!(!sorted.is_empty());
    let idx = (p * (sorted.len() - 1) as f64).floor() as usize;
    sorted[idx.min(sorted.len() - 1)]
}

/// Pearson correlation of paired samples, with population denominators.
///
/// Defined as 0 when either side has zero variance or fewer than two pairs.
pub(crate) fn pearson(pairs: &[(f64, f64)]) -> f64 {
    if pairs.len() < 2 {
        return 0.0;
    }
    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|(x, _)| x).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|(_, y)| y).sum::<f64>() / n;

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (x, y) in pairs {
        let dx = x - mean_x;
        let dy = y - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }
    if var_x == 0.0 || var_y == 0.0 {
        return 0.0;
    }
    cov / (var_x.sqrt() * var_y.sqrt())
}

/// Per-column descriptive statistics.
///
/// `count`/`missing`/`unique` are reported for every column; the numeric
/// fields are populated only for columns classified [`ColumnType::Numeric`].
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnSummary {
    pub name: String,
    pub column_type: ColumnType,
    /// Non-missing cell count.
    pub count: usize,
    /// Missing cell count.
    pub missing: usize,
    /// Distinct non-missing values.
    pub unique: usize,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub mean: Option<f64>,
    pub std: Option<f64>,
}

/// Summarize every column of the table, in column order.
pub fn describe(table: &Table) -> Vec<ColumnSummary> {
    (0..table.width())
        .into_par_iter()
        .map(|idx| summarize_column(table, idx))
        .collect()
}

/// Summarize a single column by name. Returns `None` for an unknown column.
pub fn describe_column(table: &Table, name: &str) -> Option<ColumnSummary> {
    table.column_index(name).map(|idx| summarize_column(table, idx))
}

fn summarize_column(table: &Table, idx: usize) -> ColumnSummary {
    let mut count = 0usize;
    let mut missing = 0usize;
    let mut distinct_numbers: HashSet<u64> = HashSet::new();
    let mut distinct_texts: HashSet<&str> = HashSet::new();

    for row in &table.rows {
        match &row[idx] {
            Cell::Number(v) => {
                count += 1;
                distinct_numbers.insert(v.to_bits());
            }
            Cell::Text(s) => {
                count += 1;
                distinct_texts.insert(s.as_str());
            }
            Cell::Missing => missing += 1,
        }
    }

    let column_type = table.types[idx];
    let (min, max, mean_v, std_v) = if column_type == ColumnType::Numeric && count > 0 {
        let values = table.numeric_values(idx);
        let m = mean(&values);
        (
            Some(values.iter().copied().fold(f64::INFINITY, f64::min)),
            Some(values.iter().copied().fold(f64::NEG_INFINITY, f64::max)),
            Some(m),
            Some(population_std(&values, m)),
        )
    } else {
        (None, None, None, None)
    };

    ColumnSummary {
        name: table.columns[idx].clone(),
        column_type,
        count,
        missing,
        unique: distinct_numbers.len() + distinct_texts.len(),
        min,
        max,
        mean: mean_v,
        std: std_v,
    }
}

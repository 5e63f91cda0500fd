//! Visualization-ready aggregates: histograms, scatter pairs, and Pearson
//! correlation matrices.
//!
//! Like [`crate::stats`], this module is read-only over the table and never
//! appends a pipeline step.

use rayon::prelude::*;
use serde::Serialize;

use crate::error::{PrepError, PrepResult};
use crate::stats::pearson;
use crate::types::{ColumnType, Table};

/// Default bin count for [`histogram`].
pub const DEFAULT_BINS: usize = 10;

/// Equal-width histogram of a column's numeric values.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Histogram {
    pub column: String,
    /// Minimum of the binned values (left edge of bin 0).
    pub min: f64,
    /// Maximum of the binned values (right edge of the last bin).
    pub max: f64,
    pub bin_size: f64,
    /// Per-bin counts, `counts.len() == bins`.
    pub counts: Vec<usize>,
}

/// Compute an equal-width histogram over the non-missing numeric values of
/// `column`.
///
/// Bin membership is `floor((v - min) / bin_size)`, clamped to the last bin.
/// When every value is identical the range is zero and all values land in
/// bin 0. Errors with [`PrepError::Configuration`] for an unknown column, a
/// zero bin count, or a column with no numeric values.
pub fn histogram(table: &Table, column: &str, bins: usize) -> PrepResult<Histogram> {
    if bins == 0 {
        return Err(PrepError::config("histogram needs at least one bin"));
    }
    let idx = table
        .column_index(column)
        .ok_or_else(|| PrepError::config(format!("unknown column '{column}'")))?;

    let values = table.numeric_values(idx);
    if values.is_empty() {
        return Err(PrepError::config(format!(
            "column '{column}' has no numeric values to bin"
        )));
    }

    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let bin_size = (max - min) / bins as f64;

    let mut counts = vec![0usize; bins];
    for v in &values {
        let bin = if bin_size == 0.0 {
            0
        } else {
            (((v - min) / bin_size).floor() as usize).min(bins - 1)
        };
        counts[bin] += 1;
    }

    Ok(Histogram {
        column: column.to_string(),
        min,
        max,
        bin_size,
        counts,
    })
}

/// Paired `(x, y)` points for rows where both cells are numeric.
pub fn scatter(table: &Table, column_x: &str, column_y: &str) -> PrepResult<Vec<(f64, f64)>> {
    let ix = table
        .column_index(column_x)
        .ok_or_else(|| PrepError::config(format!("unknown column '{column_x}'")))?;
    let iy = table
        .column_index(column_y)
        .ok_or_else(|| PrepError::config(format!("unknown column '{column_y}'")))?;

    Ok(table
        .rows
        .iter()
        .filter_map(|row| match (row[ix].as_number(), row[iy].as_number()) {
            (Some(x), Some(y)) => Some((x, y)),
            _ => None,
        })
        .collect())
}

/// Symmetric Pearson correlation matrix over a set of numeric columns.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CorrelationMatrix {
    /// Columns in matrix order.
    pub columns: Vec<String>,
    /// `values[i][j]` is the correlation of `columns[i]` with `columns[j]`;
    /// the diagonal is 1.
    pub values: Vec<Vec<f64>>,
}

/// Compute the Pearson correlation matrix for the given columns.
///
/// Each pair correlates over rows where both cells are numeric; a pair with
/// zero variance on either side is defined as 0. Errors with
/// [`PrepError::Configuration`] if a column is unknown or not numeric.
pub fn correlation_matrix(table: &Table, columns: &[&str]) -> PrepResult<CorrelationMatrix> {
    let mut idxs = Vec::with_capacity(columns.len());
    for name in columns {
        let idx = table
            .column_index(name)
            .ok_or_else(|| PrepError::config(format!("unknown column '{name}'")))?;
        if table.types[idx] != ColumnType::Numeric {
            return Err(PrepError::config(format!(
                "column '{name}' is not numeric"
            )));
        }
        idxs.push(idx);
    }

    let n = idxs.len();
    // Upper-triangle pairs, computed in parallel; the matrix is filled
    // symmetrically afterwards.
    let pairs: Vec<(usize, usize)> = (0..n)
        .flat_map(|i| ((i + 1)..n).map(move |j| (i, j)))
        .collect();

    let computed: Vec<((usize, usize), f64)> = pairs
        .par_iter()
        .map(|&(i, j)| {
            let samples: Vec<(f64, f64)> = table
                .rows
                .iter()
                .filter_map(|row| {
                    match (row[idxs[i]].as_number(), row[idxs[j]].as_number()) {
                        (Some(x), Some(y)) => Some((x, y)),
                        _ => None,
                    }
                })
                .collect();
            ((i, j), pearson(&samples))
        })
        .collect();

    let mut values = vec![vec![0.0; n]; n];
    for i in 0..n {
        values[i][i] = 1.0;
    }
    for ((i, j), r) in computed {
        values[i][j] = r;
        values[j][i] = r;
    }

    Ok(CorrelationMatrix {
        columns: columns.iter().map(|s| s.to_string()).collect(),
        values,
    })
}

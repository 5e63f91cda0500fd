//! Numeric column normalization.

use serde::{Deserialize, Serialize};

use crate::error::PrepResult;
use crate::stats::{mean, population_std, quantile_sorted};
use crate::types::{Cell, ColumnType, Table};

use super::resolve_targets;

/// Normalization method for numeric columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScaleMethod {
    /// `(x - min) / (max - min)`.
    Minmax,
    /// `(x - mean) / std`, population std.
    Zscore,
    /// `(x - median) / iqr`.
    Robust,
}

/// Parameters recorded for a `normalize` step.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizeParams {
    pub method: ScaleMethod,
    pub target_columns: Option<Vec<String>>,
}

/// Center/scale pair fitted from one column's non-missing values.
///
/// A zero scale (zero range, zero std, zero IQR) is replaced by 1 so the
/// transform always completes on degenerate columns.
#[derive(Debug, Clone, Copy)]
struct ScaleParams {
    center: f64,
    scale: f64,
}

/// Normalize the targeted numeric columns in place.
///
/// Non-numeric columns among the targets are skipped; missing cells are left
/// missing.
pub fn normalize(
    table: &mut Table,
    method: ScaleMethod,
    target_columns: Option<&[&str]>,
) -> PrepResult<()> {
    let targets = resolve_targets(table, target_columns)?;

    for idx in targets {
        if table.types[idx] != ColumnType::Numeric {
            continue;
        }
        let values = table.numeric_values(idx);
        if values.is_empty() {
            continue;
        }
        let params = fit_params(&values, method);
        for row in &mut table.rows {
            if let Cell::Number(v) = &mut row[idx] {
                *v = (*v - params.center) / params.scale;
            }
        }
    }
    Ok(())
}

fn fit_params(values: &[f64], method: ScaleMethod) -> ScaleParams {
    match method {
        ScaleMethod::Minmax => {
            let min = values.iter().copied().fold(f64::INFINITY, f64::min);
            let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            let range = max - min;
            ScaleParams {
                center: min,
                scale: if range == 0.0 { 1.0 } else { range },
            }
        }
        ScaleMethod::Zscore => {
            let m = mean(values);
            let std = population_std(values, m);
            ScaleParams {
                center: m,
                scale: if std == 0.0 { 1.0 } else { std },
            }
        }
        ScaleMethod::Robust => {
            let mut sorted = values.to_vec();
            sorted.sort_by(|a, b| a.partial_cmp(b).expect("finite cells"));
            let median = quantile_sorted(&sorted, 0.5);
            let iqr = quantile_sorted(&sorted, 0.75) - quantile_sorted(&sorted, 0.25);
            ScaleParams {
                center: median,
                scale: if iqr == 0.0 { 1.0 } else { iqr },
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{normalize, ScaleMethod};
    use crate::ingestion::csv::parse_csv_str;
    use crate::types::Cell;

    fn column(table: &crate::types::Table, idx: usize) -> Vec<f64> {
        table.rows.iter().filter_map(|r| r[idx].as_number()).collect()
    }

    #[test]
    fn minmax_maps_min_to_zero_and_max_to_one() {
        let mut table = parse_csv_str("age,z\n25,0\n30,0\n35,0\n").unwrap();
        normalize(&mut table, ScaleMethod::Minmax, Some(&["age"])).unwrap();
        assert_eq!(column(&table, 0), vec![0.0, 0.5, 1.0]);
    }

    #[test]
    fn minmax_constant_column_becomes_all_zero() {
        let mut table = parse_csv_str("a,b\n5,1\n5,2\n").unwrap();
        normalize(&mut table, ScaleMethod::Minmax, Some(&["a"])).unwrap();
        assert_eq!(column(&table, 0), vec![0.0, 0.0]);
    }

    #[test]
    fn zscore_centers_on_zero() {
        let mut table = parse_csv_str("a,b\n1,0\n2,0\n3,0\n").unwrap();
        normalize(&mut table, ScaleMethod::Zscore, Some(&["a"])).unwrap();
        let vals = column(&table, 0);
        let sum: f64 = vals.iter().sum();
        assert!(sum.abs() < 1e-12);
        assert!(vals[0] < 0.0 && vals[2] > 0.0);
    }

    #[test]
    fn robust_divides_by_iqr() {
        // sorted [1,2,3,4,5]: q1=2, median=3, q3=4, iqr=2
        let mut table = parse_csv_str("a,b\n1,0\n2,0\n3,0\n4,0\n5,0\n").unwrap();
        normalize(&mut table, ScaleMethod::Robust, Some(&["a"])).unwrap();
        assert_eq!(column(&table, 0), vec![-1.0, -0.5, 0.0, 0.5, 1.0]);
    }

    #[test]
    fn missing_cells_and_text_columns_are_untouched() {
        let mut table = parse_csv_str("a,name\n10,x\n,y\n20,z\n").unwrap();
        normalize(&mut table, ScaleMethod::Minmax, None).unwrap();
        assert_eq!(table.rows[1][0], Cell::Missing);
        assert_eq!(table.rows[0][1], Cell::Text("x".to_string()));
    }
}

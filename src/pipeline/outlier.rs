//! Outlier clipping for numeric columns.

use serde::{Deserialize, Serialize};

use crate::error::PrepResult;
use crate::stats::{mean, population_std, quantile_sorted};
use crate::types::{Cell, ColumnType, Table};

use super::resolve_targets;

/// Rule used to bound numeric values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutlierMethod {
    /// Clip into `[q1 - 1.5*iqr, q3 + 1.5*iqr]`.
    Iqr,
    /// Replace values with `|z| > threshold` by `mean ± threshold*std`.
    Zscore,
    /// Clip into `[pN, pM]` percentile bounds.
    Percentile,
}

/// Configuration for [`clip_outliers`], also the recorded step parameters
/// (as a `feature_engineering` step with `action: "clip_outliers"`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClipOutliers {
    pub method: OutlierMethod,
    /// Z-score threshold; defaults to 3.
    pub threshold: Option<f64>,
    /// Lower percentile bound (0-100); defaults to 1.
    pub lower_percentile: Option<f64>,
    /// Upper percentile bound (0-100); defaults to 99.
    pub upper_percentile: Option<f64>,
    pub target_columns: Option<Vec<String>>,
}

impl ClipOutliers {
    /// IQR-fence clipping with no column filter.
    pub fn iqr() -> Self {
        Self {
            method: OutlierMethod::Iqr,
            threshold: None,
            lower_percentile: None,
            upper_percentile: None,
            target_columns: None,
        }
    }

    /// Z-score clipping at the given threshold.
    pub fn zscore(threshold: f64) -> Self {
        Self {
            method: OutlierMethod::Zscore,
            threshold: Some(threshold),
            lower_percentile: None,
            upper_percentile: None,
            target_columns: None,
        }
    }

    /// Percentile clipping into `[lower, upper]` (0-100).
    pub fn percentile(lower: f64, upper: f64) -> Self {
        Self {
            method: OutlierMethod::Percentile,
            threshold: None,
            lower_percentile: Some(lower),
            upper_percentile: Some(upper),
            target_columns: None,
        }
    }

    /// Limit clipping to the named columns.
    pub fn with_target_columns(mut self, columns: &[&str]) -> Self {
        self.target_columns = Some(columns.iter().map(|s| s.to_string()).collect());
        self
    }
}

/// Clip outliers in the targeted numeric columns in place.
///
/// Non-numeric columns among the targets are skipped; missing cells are left
/// missing.
pub fn clip_outliers(table: &mut Table, config: &ClipOutliers) -> PrepResult<()> {
    let target_refs: Option<Vec<&str>> = config
        .target_columns
        .as_ref()
        .map(|v| v.iter().map(String::as_str).collect());
    let targets = resolve_targets(table, target_refs.as_deref())?;

    for idx in targets {
        if table.types[idx] != ColumnType::Numeric {
            continue;
        }
        let values = table.numeric_values(idx);
        if values.is_empty() {
            continue;
        }

        match config.method {
            OutlierMethod::Iqr => {
                let mut sorted = values;
                sorted.sort_by(|a, b| a.partial_cmp(b).expect("finite cells"));
                let q1 = quantile_sorted(&sorted, 0.25);
                let q3 = quantile_sorted(&sorted, 0.75);
                let iqr = q3 - q1;
                clamp_column(table, idx, q1 - 1.5 * iqr, q3 + 1.5 * iqr);
            }
            OutlierMethod::Zscore => {
                let threshold = config.threshold.unwrap_or(3.0);
                let m = mean(&values);
                let std = population_std(&values, m);
                if std == 0.0 {
                    continue;
                }
                for row in &mut table.rows {
                    if let Cell::Number(v) = &mut row[idx] {
                        let z = (*v - m) / std;
                        if z > threshold {
                            *v = m + threshold * std;
                        } else if z < -threshold {
                            *v = m - threshold * std;
                        }
                    }
                }
            }
            OutlierMethod::Percentile => {
                let lower = config.lower_percentile.unwrap_or(1.0) / 100.0;
                let upper = config.upper_percentile.unwrap_or(99.0) / 100.0;
                let mut sorted = values;
                sorted.sort_by(|a, b| a.partial_cmp(b).expect("finite cells"));
                let lo = quantile_sorted(&sorted, lower);
                let hi = quantile_sorted(&sorted, upper);
                clamp_column(table, idx, lo, hi);
            }
        }
    }
    Ok(())
}

fn clamp_column(table: &mut Table, idx: usize, lo: f64, hi: f64) {
    for row in &mut table.rows {
        if let Cell::Number(v) = &mut row[idx] {
            *v = v.clamp(lo, hi);
        }
    }
}

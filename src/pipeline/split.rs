//! Train/validation/test splitting.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::error::{PrepError, PrepResult};
use crate::types::{Cell, Table};

/// Partition ratios. They need not sum to exactly 1.0; testing receives
/// every row not claimed by training/validation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SplitRatios {
    pub train: f64,
    pub validation: f64,
    pub test: f64,
}

impl Default for SplitRatios {
    fn default() -> Self {
        Self {
            train: 0.7,
            validation: 0.15,
            test: 0.15,
        }
    }
}

/// Parameters recorded for a `split_data` step.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SplitParams {
    pub split_ratios: SplitRatios,
    /// Shuffle seed; `None` means the shuffle was entropy-seeded and the
    /// split is not replayable.
    pub seed: Option<u64>,
}

/// Three disjoint row subsets, each a full-width copy of rows with the
/// table's column layout at split time.
///
/// The subsets are copies: they are not re-synced if the table mutates
/// afterwards, which is why splitting should be the last row-level step.
#[derive(Debug, Clone, PartialEq)]
pub struct SplitResult {
    pub training: Vec<Vec<Cell>>,
    pub validation: Vec<Vec<Cell>>,
    pub testing: Vec<Vec<Cell>>,
}

impl SplitResult {
    /// Total rows across all three subsets.
    pub fn total_rows(&self) -> usize {
        self.training.len() + self.validation.len() + self.testing.len()
    }
}

/// Shuffle all rows and partition them: `floor(n * train)` rows for
/// training, the next `floor(n * validation)` for validation, the remainder
/// for testing.
///
/// A `seed` makes the shuffle reproducible; without one the generator is
/// entropy-seeded.
pub fn split_data(
    table: &Table,
    ratios: SplitRatios,
    seed: Option<u64>,
) -> PrepResult<SplitResult> {
    if ratios.train < 0.0 || ratios.validation < 0.0 || ratios.test < 0.0 {
        return Err(PrepError::config("split ratios must be non-negative"));
    }
    if ratios.train + ratios.validation + ratios.test > 1.0 + 1e-9 {
        return Err(PrepError::config("split ratios must not sum above 1.0"));
    }

    let n = table.row_count();
    let mut indices: Vec<usize> = (0..n).collect();
    let mut rng: StdRng = match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_entropy(),
    };
    indices.shuffle(&mut rng);

    let n_train = ((((n as f64) * ratios.train).floor()) as usize).min(n);
    let n_validation = (((n as f64) * ratios.validation).floor() as usize).min(n - n_train);

    let copy = |idxs: &[usize]| -> Vec<Vec<Cell>> {
        idxs.iter().map(|&i| table.rows[i].clone()).collect()
    };

    Ok(SplitResult {
        training: copy(&indices[..n_train]),
        validation: copy(&indices[n_train..n_train + n_validation]),
        testing: copy(&indices[n_train + n_validation..]),
    })
}

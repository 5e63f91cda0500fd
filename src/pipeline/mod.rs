//! The preprocessing pipeline: one [`Preprocessor`] owns one working
//! [`Table`], mutates it in place through the named transforms, and appends
//! every applied transform to its [`StepLog`].
//!
//! Concurrency contract: a `Preprocessor` is a single-owner object. Every
//! transform runs to completion before returning and two pipelines never
//! share a table; in a service context this is one instance per session.
//!
//! ## Example: CSV to tensors
//!
//! ```rust
//! use tabular_preprocessing::pipeline::{
//!     MissingStrategy, Preprocessor, ScaleMethod, SplitRatios,
//! };
//!
//! # fn main() -> Result<(), tabular_preprocessing::PrepError> {
//! let mut prep = Preprocessor::from_csv_str("age,income,label\n25,50000,0\n30,,1\n35,70000,0\n")?;
//! prep.handle_missing_values(MissingStrategy::Mean, None)?;
//! prep.normalize(ScaleMethod::Minmax, None)?;
//! prep.split_data(SplitRatios { train: 0.7, validation: 0.15, test: 0.15 }, Some(42))?;
//!
//! let bundle = prep.to_tensors()?;
//! assert_eq!(bundle.metadata.input_shape, vec![2]);
//! assert_eq!(bundle.metadata.label_names, vec!["label"]);
//! # Ok(())
//! # }
//! ```

pub mod encode;
pub mod impute;
pub mod outlier;
pub mod scale;
pub mod split;
pub mod step;
pub mod tensor;

pub use encode::{EncodeMethod, EncodeParams};
pub use impute::{HandleMissingParams, MissingStrategy};
pub use outlier::{ClipOutliers, OutlierMethod};
pub use scale::{NormalizeParams, ScaleMethod};
pub use split::{SplitParams, SplitRatios, SplitResult};
pub use step::{PipelineStep, StepKind, StepLog};
pub use tensor::{TensorBundle, TensorMetadata, TensorParams};

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{PrepError, PrepResult};
use crate::ingestion::{self, IngestOptions};
use crate::stats::{self, ColumnSummary};
use crate::types::Table;
use crate::visualize::{self, CorrelationMatrix, Histogram, DEFAULT_BINS};

/// Parameters recorded for a `load` step.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadParams {
    pub source: String,
    pub rows: usize,
    pub columns: usize,
}

/// Parameters recorded for a `feature_engineering` step.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FeatureEngineeringParams {
    action: String,
    #[serde(flatten)]
    config: ClipOutliers,
}

const CLIP_OUTLIERS_ACTION: &str = "clip_outliers";

/// Session-scoped owner of one working table, its step log, and any derived
/// split state.
#[derive(Debug, Clone)]
pub struct Preprocessor {
    table: Table,
    log: StepLog,
    split: Option<SplitResult>,
}

impl Preprocessor {
    /// Start a pipeline from raw CSV text.
    pub fn from_csv_str(input: &str) -> PrepResult<Self> {
        Self::with_load_step(ingestion::csv::parse_csv_str(input)?, "csv")
    }

    /// Start a pipeline from raw JSON text (an array of objects).
    pub fn from_json_str(input: &str) -> PrepResult<Self> {
        Self::with_load_step(ingestion::json::parse_json_str(input)?, "json")
    }

    /// Start a pipeline from a CSV or JSON file (format auto-detected, with
    /// optional observer reporting; see [`crate::ingestion::ingest_from_path`]).
    pub fn from_path(path: impl AsRef<Path>, options: &IngestOptions) -> PrepResult<Self> {
        let path = path.as_ref();
        let table = ingestion::ingest_from_path(path, options)?;
        Self::with_load_step(table, "file")
    }

    /// Start a pipeline from an already-built table.
    pub fn from_table(table: Table) -> PrepResult<Self> {
        Self::with_load_step(table, "table")
    }

    fn with_load_step(table: Table, source: &str) -> PrepResult<Self> {
        let mut prep = Self {
            table,
            log: StepLog::new(),
            split: None,
        };
        let params = LoadParams {
            source: source.to_string(),
            rows: prep.table.row_count(),
            columns: prep.table.width(),
        };
        prep.log.record(StepKind::Load, &params)?;
        Ok(prep)
    }

    /// The current working table.
    pub fn table(&self) -> &Table {
        &self.table
    }

    /// All recorded steps, sorted by order.
    pub fn steps(&self) -> &[PipelineStep] {
        self.log.steps()
    }

    /// The split partitions, if [`Self::split_data`] has run.
    pub fn split(&self) -> Option<&SplitResult> {
        self.split.as_ref()
    }

    /// Serialize the step log for the persistence collaborator.
    pub fn steps_to_json(&self) -> PrepResult<String> {
        self.log.to_json()
    }

    /// Clear the step log and any derived split state. The table itself is
    /// left as-is; both cleared pieces go together, never partially.
    pub fn reset(&mut self) {
        self.log.clear();
        self.split = None;
    }

    /// Fill or remove missing values. Appends a `handle_missing` step.
    pub fn handle_missing_values(
        &mut self,
        strategy: MissingStrategy,
        target_columns: Option<&[&str]>,
    ) -> PrepResult<()> {
        impute::handle_missing_values(&mut self.table, strategy, target_columns)?;
        self.log.record(
            StepKind::HandleMissing,
            &HandleMissingParams {
                strategy,
                target_columns: owned_targets(target_columns),
            },
        )
    }

    /// Normalize numeric columns. Appends a `normalize` step.
    pub fn normalize(
        &mut self,
        method: ScaleMethod,
        target_columns: Option<&[&str]>,
    ) -> PrepResult<()> {
        scale::normalize(&mut self.table, method, target_columns)?;
        self.log.record(
            StepKind::Normalize,
            &NormalizeParams {
                method,
                target_columns: owned_targets(target_columns),
            },
        )
    }

    /// Encode categorical columns. Appends an `encode_categorical` step.
    pub fn encode_categorical(
        &mut self,
        method: EncodeMethod,
        target_columns: Option<&[&str]>,
        target_column: Option<&str>,
    ) -> PrepResult<()> {
        encode::encode_categorical(&mut self.table, method, target_columns, target_column)?;
        self.log.record(
            StepKind::EncodeCategorical,
            &EncodeParams {
                method,
                target_columns: owned_targets(target_columns),
                target_column: target_column.map(str::to_string),
            },
        )
    }

    /// Bound numeric outliers. Appends a `feature_engineering` step with
    /// `action: "clip_outliers"`.
    pub fn clip_outliers(&mut self, config: &ClipOutliers) -> PrepResult<()> {
        outlier::clip_outliers(&mut self.table, config)?;
        self.log.record(
            StepKind::FeatureEngineering,
            &FeatureEngineeringParams {
                action: CLIP_OUTLIERS_ACTION.to_string(),
                config: config.clone(),
            },
        )
    }

    /// Shuffle and partition rows. Appends a `split_data` step recording the
    /// ratios and the seed.
    ///
    /// The partitions are row copies of the table at this instant; run this
    /// after imputation/encoding/scaling/clipping are complete.
    pub fn split_data(&mut self, ratios: SplitRatios, seed: Option<u64>) -> PrepResult<()> {
        self.split = Some(split::split_data(&self.table, ratios, seed)?);
        self.log.record(
            StepKind::SplitData,
            &SplitParams {
                split_ratios: ratios,
                seed,
            },
        )
    }

    /// Flatten the split partitions into a [`TensorBundle`]. The last column
    /// is the label, all others features. Appends a `convert_to_tensor` step.
    ///
    /// Fails with [`PrepError::Precondition`] unless [`Self::split_data`] has
    /// been called.
    pub fn to_tensors(&mut self) -> PrepResult<TensorBundle> {
        let split = self
            .split
            .as_ref()
            .ok_or_else(|| PrepError::precondition("split_data must run before tensor conversion"))?;
        if self.table.width() == 0 {
            return Err(PrepError::config("table has no columns to materialize"));
        }

        let n_features = self.table.width() - 1;
        self.log.record(
            StepKind::ConvertToTensor,
            &TensorParams {
                feature_columns: self.table.columns[..n_features].to_vec(),
                label_column: self.table.columns[n_features].clone(),
            },
        )?;
        Ok(tensor::materialize(
            &self.table,
            split,
            self.log.steps().to_vec(),
        ))
    }

    /// Re-apply a recorded step sequence to a fresh table.
    ///
    /// Steps are applied in `order`; `load` steps are informational (the
    /// table is already supplied). Given recorded seeds this reproduces the
    /// original pipeline deterministically on an equivalent input.
    pub fn replay(table: Table, steps: &[PipelineStep]) -> PrepResult<Self> {
        let mut prep = Self::with_load_step(table, "replay")?;
        let mut ordered: Vec<&PipelineStep> = steps.iter().collect();
        ordered.sort_by_key(|s| s.order);
        for step in ordered {
            prep.apply_recorded(step)?;
        }
        Ok(prep)
    }

    fn apply_recorded(&mut self, step: &PipelineStep) -> PrepResult<()> {
        match step.kind {
            StepKind::Load => Ok(()),
            StepKind::HandleMissing => {
                let p: HandleMissingParams = serde_json::from_value(step.parameters.clone())?;
                self.handle_missing_values(p.strategy, borrowed_targets(&p.target_columns).as_deref())
            }
            StepKind::Normalize => {
                let p: NormalizeParams = serde_json::from_value(step.parameters.clone())?;
                self.normalize(p.method, borrowed_targets(&p.target_columns).as_deref())
            }
            StepKind::EncodeCategorical => {
                let p: EncodeParams = serde_json::from_value(step.parameters.clone())?;
                self.encode_categorical(
                    p.method,
                    borrowed_targets(&p.target_columns).as_deref(),
                    p.target_column.as_deref(),
                )
            }
            StepKind::FeatureEngineering => {
                let p: FeatureEngineeringParams = serde_json::from_value(step.parameters.clone())?;
                if p.action != CLIP_OUTLIERS_ACTION {
                    return Err(PrepError::config(format!(
                        "unsupported feature_engineering action '{}'",
                        p.action
                    )));
                }
                self.clip_outliers(&p.config)
            }
            StepKind::SplitData => {
                let p: SplitParams = serde_json::from_value(step.parameters.clone())?;
                self.split_data(p.split_ratios, p.seed)
            }
            StepKind::ConvertToTensor => self.to_tensors().map(|_| ()),
            StepKind::Reshape | StepKind::Scale => Err(PrepError::config(format!(
                "step kind '{}' is not replayable",
                step.kind.as_str()
            ))),
        }
    }

    /// Serialize the current table to CSV text.
    pub fn export_csv(&self) -> PrepResult<String> {
        ingestion::csv::write_csv(&self.table)
    }

    /// Serialize the current table to a JSON array of objects.
    pub fn export_json(&self) -> PrepResult<String> {
        ingestion::json::write_json(&self.table)
    }

    /// Per-column descriptive statistics. Read-only; records no step.
    pub fn describe(&self) -> Vec<ColumnSummary> {
        stats::describe(&self.table)
    }

    /// Histogram of a numeric column; `bins` defaults to 10.
    pub fn histogram(&self, column: &str, bins: Option<usize>) -> PrepResult<Histogram> {
        visualize::histogram(&self.table, column, bins.unwrap_or(DEFAULT_BINS))
    }

    /// Paired points of two numeric columns.
    pub fn scatter(&self, column_x: &str, column_y: &str) -> PrepResult<Vec<(f64, f64)>> {
        visualize::scatter(&self.table, column_x, column_y)
    }

    /// Pearson correlation matrix over all currently numeric columns.
    pub fn correlation_matrix(&self) -> PrepResult<CorrelationMatrix> {
        let names = self.table.numeric_column_names();
        let refs: Vec<&str> = names.iter().map(String::as_str).collect();
        visualize::correlation_matrix(&self.table, &refs)
    }
}

/// All column indices, or the indices of the named columns; unknown names
/// are a configuration error.
pub(crate) fn resolve_targets(
    table: &Table,
    target_columns: Option<&[&str]>,
) -> PrepResult<Vec<usize>> {
    match target_columns {
        None => Ok((0..table.width()).collect()),
        Some(names) => names
            .iter()
            .map(|name| {
                table
                    .column_index(name)
                    .ok_or_else(|| PrepError::config(format!("unknown column '{name}'")))
            })
            .collect(),
    }
}

fn owned_targets(target_columns: Option<&[&str]>) -> Option<Vec<String>> {
    target_columns.map(|names| names.iter().map(|s| s.to_string()).collect())
}

fn borrowed_targets(target_columns: &Option<Vec<String>>) -> Option<Vec<&str>> {
    target_columns
        .as_ref()
        .map(|names| names.iter().map(String::as_str).collect())
}

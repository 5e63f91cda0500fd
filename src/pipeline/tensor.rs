//! Flattening split row subsets into training-ready tensors.

use serde::{Deserialize, Serialize};

use crate::types::{Cell, Table};

use super::split::SplitResult;
use super::step::PipelineStep;

/// Shape and provenance metadata attached to a [`TensorBundle`].
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TensorMetadata {
    /// `[number of feature columns]`.
    pub input_shape: Vec<usize>,
    /// Always `[1]`: a single label column.
    pub output_shape: Vec<usize>,
    pub feature_names: Vec<String>,
    pub label_names: Vec<String>,
    /// The full step log at materialization time.
    pub preprocessing_steps: Vec<PipelineStep>,
}

/// Flat numeric arrays for each partition, ready for a training collaborator.
///
/// Feature arrays are row-major: all features of row 0, then row 1, and so
/// on. Any residual non-numeric cell coerces to 0.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TensorBundle {
    pub training_data: Vec<f64>,
    pub training_labels: Vec<f64>,
    pub validation_data: Vec<f64>,
    pub validation_labels: Vec<f64>,
    pub testing_data: Vec<f64>,
    pub testing_labels: Vec<f64>,
    pub metadata: TensorMetadata,
}

/// Parameters recorded for a `convert_to_tensor` step.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TensorParams {
    pub feature_columns: Vec<String>,
    pub label_column: String,
}

/// Flatten the split partitions. The table's last column is the label; all
/// preceding columns are features.
pub(crate) fn materialize(
    table: &Table,
    split: &SplitResult,
    steps: Vec<PipelineStep>,
) -> TensorBundle {
    let width = table.width();
    let n_features = width.saturating_sub(1);

    let flatten = |rows: &[Vec<Cell>]| -> (Vec<f64>, Vec<f64>) {
        let mut data = Vec::with_capacity(rows.len() * n_features);
        let mut labels = Vec::with_capacity(rows.len());
        for row in rows {
            for cell in &row[..n_features] {
                data.push(cell.as_number().unwrap_or(0.0));
            }
            labels.push(row[n_features].as_number().unwrap_or(0.0));
        }
        (data, labels)
    };

    let (training_data, training_labels) = flatten(&split.training);
    let (validation_data, validation_labels) = flatten(&split.validation);
    let (testing_data, testing_labels) = flatten(&split.testing);

    TensorBundle {
        training_data,
        training_labels,
        validation_data,
        validation_labels,
        testing_data,
        testing_labels,
        metadata: TensorMetadata {
            input_shape: vec![n_features],
            output_shape: vec![1],
            feature_names: table.columns[..n_features].to_vec(),
            label_names: table.columns[n_features..].to_vec(),
            preprocessing_steps: steps,
        },
    }
}

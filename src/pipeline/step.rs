//! The pipeline step log: an ordered, timestamped record of every
//! transformation applied to a table.
//!
//! The log is independent of the table itself: serialized as JSON it is what
//! the surrounding platform stores as a "saved pipeline", and replaying the
//! same ordered steps against an equivalent input table reproduces the same
//! table (see [`crate::pipeline::Preprocessor::replay`]).

use serde::{Deserialize, Serialize};

use crate::error::PrepResult;
use crate::ingestion::observability::unix_ts;

/// Kind of a recorded pipeline step.
///
/// `Reshape` and `Scale` are part of the recorded-log vocabulary consumed by
/// the platform but are not produced by any operation in this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepKind {
    Load,
    HandleMissing,
    Normalize,
    EncodeCategorical,
    FeatureEngineering,
    SplitData,
    ConvertToTensor,
    Reshape,
    Scale,
}

impl StepKind {
    /// Snake-case name, used as the step id prefix.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Load => "load",
            Self::HandleMissing => "handle_missing",
            Self::Normalize => "normalize",
            Self::EncodeCategorical => "encode_categorical",
            Self::FeatureEngineering => "feature_engineering",
            Self::SplitData => "split_data",
            Self::ConvertToTensor => "convert_to_tensor",
            Self::Reshape => "reshape",
            Self::Scale => "scale",
        }
    }
}

/// One immutable log entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineStep {
    /// Unique id: the kind prefix plus the monotonic order suffix.
    pub id: String,
    /// Step kind (the `type` field on the wire).
    #[serde(rename = "type")]
    pub kind: StepKind,
    /// Exact configuration used, as recorded JSON.
    pub parameters: serde_json::Value,
    /// Execution order; the log keeps steps sorted ascending.
    pub order: u64,
    /// Unix timestamp of application.
    pub applied_at: u64,
}

/// Append-only, ordered step log.
#[derive(Debug, Clone, Default)]
pub struct StepLog {
    steps: Vec<PipelineStep>,
    next_order: u64,
}

impl StepLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a step of `kind` with its serialized parameters.
    pub fn record<P: Serialize>(&mut self, kind: StepKind, parameters: &P) -> PrepResult<()> {
        let order = self.next_order;
        self.next_order += 1;
        self.steps.push(PipelineStep {
            id: format!("{}-{order}", kind.as_str()),
            kind,
            parameters: serde_json::to_value(parameters)?,
            order,
            applied_at: unix_ts(),
        });
        Ok(())
    }

    /// All recorded steps, sorted by `order`.
    pub fn steps(&self) -> &[PipelineStep] {
        &self.steps
    }

    /// Clear the log. Used by `reset`, together with clearing split state.
    pub fn clear(&mut self) {
        self.steps.clear();
        self.next_order = 0;
    }

    /// Serialize the log for the persistence collaborator.
    pub fn to_json(&self) -> PrepResult<String> {
        Ok(serde_json::to_string(&self.steps)?)
    }

    /// Deserialize steps previously produced by [`Self::to_json`], sorted by
    /// `order`.
    pub fn steps_from_json(json: &str) -> PrepResult<Vec<PipelineStep>> {
        let mut steps: Vec<PipelineStep> = serde_json::from_str(json)?;
        steps.sort_by_key(|s| s.order);
        Ok(steps)
    }
}

#[cfg(test)]
mod tests {
    use super::{StepKind, StepLog};
    use serde_json::json;

    #[test]
    fn record_assigns_prefixed_ids_and_ascending_order() {
        let mut log = StepLog::new();
        log.record(StepKind::Load, &json!({"format": "csv"})).unwrap();
        log.record(StepKind::Normalize, &json!({"method": "minmax"}))
            .unwrap();

        let steps = log.steps();
        assert_eq!(steps.len(), 2);
        assert_eq!(steps[0].id, "load-0");
        assert_eq!(steps[1].id, "normalize-1");
        assert!(steps[0].order < steps[1].order);
        assert!(steps[0].applied_at > 0);
    }

    #[test]
    fn json_round_trip_preserves_kind_and_parameters() {
        let mut log = StepLog::new();
        log.record(
            StepKind::HandleMissing,
            &json!({"strategy": "mean", "targetColumns": null}),
        )
        .unwrap();

        let json = log.to_json().unwrap();
        assert!(json.contains("\"type\":\"handle_missing\""), "{json}");
        assert!(json.contains("\"appliedAt\""), "{json}");

        let steps = StepLog::steps_from_json(&json).unwrap();
        assert_eq!(steps.len(), 1);
        assert_eq!(steps[0].kind, StepKind::HandleMissing);
        assert_eq!(steps[0].parameters["strategy"], "mean");
    }

    #[test]
    fn clear_resets_order_counter() {
        let mut log = StepLog::new();
        log.record(StepKind::Load, &json!({})).unwrap();
        log.clear();
        assert!(log.steps().is_empty());
        log.record(StepKind::Load, &json!({})).unwrap();
        assert_eq!(log.steps()[0].order, 0);
    }
}

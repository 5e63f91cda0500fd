use thiserror::Error;

/// Convenience result type for preprocessing operations.
pub type PrepResult<T> = Result<T, PrepError>;

/// Error type returned across ingestion, pipeline transforms, and export.
///
/// This is a single error enum shared by the whole crate; all failures are
/// deterministic input/configuration problems and are surfaced synchronously.
#[derive(Debug, Error)]
pub enum PrepError {
    /// Underlying I/O error (e.g. file not found, permission denied).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV reader/writer error.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON (de)serialization error.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// The raw input has an invalid tabular shape (bad headers, ragged rows,
    /// a payload that is not an array of objects, ...).
    #[error("malformed input: {message}")]
    MalformedInput { message: String },

    /// No usable rows remain, either after ingestion or after `drop_rows`.
    #[error("empty dataset: {message}")]
    EmptyDataset { message: String },

    /// An operation was configured with invalid parameters (unknown column,
    /// missing target column, colliding encoded names, ...).
    #[error("invalid configuration: {message}")]
    Configuration { message: String },

    /// An operation was invoked before one it depends on (e.g. tensor
    /// conversion before splitting).
    #[error("precondition failed: {message}")]
    Precondition { message: String },
}

impl PrepError {
    pub(crate) fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedInput {
            message: message.into(),
        }
    }

    pub(crate) fn empty(message: impl Into<String>) -> Self {
        Self::EmptyDataset {
            message: message.into(),
        }
    }

    pub(crate) fn config(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub(crate) fn precondition(message: impl Into<String>) -> Self {
        Self::Precondition {
            message: message.into(),
        }
    }
}

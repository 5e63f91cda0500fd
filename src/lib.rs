//! `tabular-preprocessing` is a library for turning raw CSV/JSON uploads into
//! ML-ready numeric tensors through a recorded, replayable pipeline of
//! transformation steps.
//!
//! Ingestion parses raw text into an in-memory [`types::Table`] (ordered
//! columns, rows of [`types::Cell`]s, inferred per-column
//! [`types::ColumnType`]s). A [`pipeline::Preprocessor`] then owns that table
//! and mutates it in place through the named transforms, appending each one
//! to its step log:
//!
//! - missing-value imputation ([`pipeline::MissingStrategy`])
//! - numeric normalization ([`pipeline::ScaleMethod`])
//! - categorical encoding ([`pipeline::EncodeMethod`])
//! - outlier clipping ([`pipeline::ClipOutliers`])
//! - train/validation/test splitting ([`pipeline::SplitRatios`])
//! - tensor materialization ([`pipeline::TensorBundle`])
//!
//! The step log serializes to JSON and can be replayed against an equivalent
//! dataset ([`pipeline::Preprocessor::replay`]), which is how saved pipelines
//! and pipeline versioning work in the surrounding platform.
//!
//! ## Quick example
//!
//! ```rust
//! use tabular_preprocessing::pipeline::{MissingStrategy, Preprocessor, ScaleMethod};
//!
//! # fn main() -> Result<(), tabular_preprocessing::PrepError> {
//! let mut prep = Preprocessor::from_csv_str("name,age\nJohn,25\nJane,\nBob,35\n")?;
//!
//! // Fill the missing age with the column mean, then scale into [0, 1].
//! prep.handle_missing_values(MissingStrategy::Mean, Some(&["age"]))?;
//! prep.normalize(ScaleMethod::Minmax, Some(&["age"]))?;
//!
//! let ages: Vec<f64> = prep
//!     .table()
//!     .rows
//!     .iter()
//!     .filter_map(|row| row[1].as_number())
//!     .collect();
//! assert_eq!(ages, vec![0.0, 0.5, 1.0]);
//! # Ok(())
//! # }
//! ```
//!
//! ## Inspection
//!
//! Statistics and visualization aggregates are read-only over the current
//! table and never append a step:
//!
//! ```rust
//! use tabular_preprocessing::pipeline::Preprocessor;
//!
//! # fn main() -> Result<(), tabular_preprocessing::PrepError> {
//! let prep = Preprocessor::from_csv_str("x,y\n1,2\n2,4\n3,6\n")?;
//! let summaries = prep.describe();
//! assert_eq!(summaries[0].count, 3);
//!
//! let matrix = prep.correlation_matrix()?;
//! assert!((matrix.values[0][1] - 1.0).abs() < 1e-12);
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`ingestion`]: CSV/JSON parsing and export, unified path-based
//!   ingestion with observer hooks
//! - [`types`]: cells, column types, and the working table
//! - [`pipeline`]: the preprocessor, its transforms, and the step log
//! - [`stats`]: per-column descriptive statistics
//! - [`visualize`]: histograms, scatter pairs, correlation matrices
//! - [`error`]: the shared error enum

pub mod error;
pub mod ingestion;
pub mod pipeline;
pub mod stats;
pub mod types;
pub mod visualize;

pub use error::{PrepError, PrepResult};
pub use pipeline::Preprocessor;

//! Unified ingestion entrypoint.
//!
//! [`ingest_from_path`] reads a file and parses it into a [`Table`]:
//!
//! - If [`IngestOptions::format`] is `None`, the format is inferred from the
//!   file extension.
//! - If an [`IngestObserver`] is provided, success/failure/alerts are
//!   reported to it.
//!
//! This is the only asynchronous I/O boundary of the pipeline; everything
//! downstream operates on the in-memory table.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use crate::error::{PrepError, PrepResult};
use crate::types::Table;

use super::observability::{IngestContext, IngestObserver, IngestSeverity, IngestStats};
use super::{csv, json};

/// Supported ingestion formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    /// Comma-separated values.
    Csv,
    /// JSON array-of-objects.
    Json,
}

impl SourceFormat {
    /// Parse a format from a file extension (case-insensitive).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "csv" => Some(Self::Csv),
            "json" => Some(Self::Json),
            _ => None,
        }
    }

    /// Lower-case name, used in step parameters and log lines.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Json => "json",
        }
    }
}

/// Options controlling unified ingestion behavior.
///
/// Use [`Default`] for common cases.
#[derive(Clone)]
pub struct IngestOptions {
    /// If `None`, auto-detect format from the file extension.
    pub format: Option<SourceFormat>,
    /// Optional observer for logging/alerts.
    pub observer: Option<Arc<dyn IngestObserver>>,
    /// Severity threshold at which `on_alert` is invoked.
    pub alert_at_or_above: IngestSeverity,
}

impl fmt::Debug for IngestOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IngestOptions")
            .field("format", &self.format)
            .field("observer_set", &self.observer.is_some())
            .field("alert_at_or_above", &self.alert_at_or_above)
            .finish()
    }
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self {
            format: None,
            observer: None,
            alert_at_or_above: IngestSeverity::Critical,
        }
    }
}

/// Ingest a CSV or JSON file into a [`Table`].
///
/// When an observer is configured, this function reports:
///
/// - `on_success` on success, with row/column stats
/// - `on_failure` on failure, with a computed severity
/// - `on_alert` on failure when the computed severity is >=
///   `options.alert_at_or_above`
///
/// # Examples
///
/// ```no_run
/// use tabular_preprocessing::ingestion::{ingest_from_path, IngestOptions};
///
/// # fn main() -> Result<(), tabular_preprocessing::PrepError> {
/// // Uses the `.csv` extension to select CSV parsing.
/// let table = ingest_from_path("upload.csv", &IngestOptions::default())?;
/// println!("rows={}", table.row_count());
/// # Ok(())
/// # }
/// ```
pub fn ingest_from_path(path: impl AsRef<Path>, options: &IngestOptions) -> PrepResult<Table> {
    let path = path.as_ref();
    let format = match options.format {
        Some(f) => f,
        None => infer_format_from_path(path)?,
    };

    let ctx = IngestContext {
        path: path.to_path_buf(),
        format,
    };

    let result = match format {
        SourceFormat::Csv => csv::ingest_csv_from_path(path),
        SourceFormat::Json => json::ingest_json_from_path(path),
    };

    if let Some(obs) = options.observer.as_ref() {
        match &result {
            Ok(table) => obs.on_success(
                &ctx,
                IngestStats {
                    rows: table.row_count(),
                    columns: table.width(),
                },
            ),
            Err(e) => {
                let sev = severity_for_error(e);
                obs.on_failure(&ctx, sev, e);
                if sev >= options.alert_at_or_above {
                    obs.on_alert(&ctx, sev, e);
                }
            }
        }
    }

    result
}

fn severity_for_error(e: &PrepError) -> IngestSeverity {
    match e {
        PrepError::Io(_) => IngestSeverity::Critical,
        PrepError::Csv(err) => match err.kind() {
            ::csv::ErrorKind::Io(_) => IngestSeverity::Critical,
            _ => IngestSeverity::Error,
        },
        _ => IngestSeverity::Error,
    }
}

fn infer_format_from_path(path: &Path) -> PrepResult<SourceFormat> {
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .ok_or_else(|| {
            PrepError::malformed(format!(
                "cannot infer format: path has no extension ({})",
                path.display()
            ))
        })?;

    SourceFormat::from_extension(ext).ok_or_else(|| {
        PrepError::malformed(format!(
            "cannot infer format from extension '{ext}' for path ({})",
            path.display()
        ))
    })
}

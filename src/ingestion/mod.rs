//! Ingestion entrypoints and implementations.
//!
//! Most callers should use [`ingest_from_path`] (from [`unified`]) which:
//!
//! - auto-detects format by file extension (or you can override via
//!   [`IngestOptions`])
//! - parses into an in-memory [`crate::types::Table`] with inferred
//!   per-column types
//! - optionally reports success/failure/alerts to an [`IngestObserver`]
//!
//! Format-specific parse and export functions are also available under:
//! - [`csv`]
//! - [`json`]

pub mod csv;
pub mod json;
pub mod observability;
pub mod unified;

pub use observability::{
    CompositeObserver, FileObserver, IngestContext, IngestObserver, IngestSeverity, IngestStats,
    StdErrObserver,
};
pub use unified::{ingest_from_path, IngestOptions, SourceFormat};

use crate::error::{PrepError, PrepResult};
use crate::types::Cell;

/// Drop rows that are entirely missing; error if nothing remains.
pub(crate) fn finalize_rows(mut rows: Vec<Vec<Cell>>) -> PrepResult<Vec<Vec<Cell>>> {
    rows.retain(|row| row.iter().any(|cell| !cell.is_missing()));
    if rows.is_empty() {
        return Err(PrepError::empty("no usable rows after ingestion"));
    }
    Ok(rows)
}

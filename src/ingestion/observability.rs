use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::PrepError;

use super::unified::SourceFormat;

/// Severity classification used for observer callbacks and alerting
/// thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum IngestSeverity {
    /// Informational event.
    Info,
    /// Warning-level event (non-fatal).
    Warning,
    /// Error-level event (operation failed).
    Error,
    /// Critical error (typically I/O failures).
    Critical,
}

/// Context about an ingestion attempt.
#[derive(Debug, Clone)]
pub struct IngestContext {
    /// The input path used for ingestion.
    pub path: PathBuf,
    /// Format used for ingestion.
    pub format: SourceFormat,
}

/// Minimal stats reported on successful ingestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngestStats {
    /// Number of ingested rows.
    pub rows: usize,
    /// Number of ingested columns.
    pub columns: usize,
}

/// Observer interface for ingestion outcomes.
///
/// Implementors can record metrics, logs, or trigger alerts.
pub trait IngestObserver: Send + Sync {
    /// Called when ingestion succeeds.
    fn on_success(&self, _ctx: &IngestContext, _stats: IngestStats) {}

    /// Called when ingestion fails.
    fn on_failure(&self, _ctx: &IngestContext, _severity: IngestSeverity, _error: &PrepError) {}

    /// Called when an ingestion failure meets an alert threshold.
    ///
    /// Default behavior forwards to [`Self::on_failure`].
    fn on_alert(&self, ctx: &IngestContext, severity: IngestSeverity, error: &PrepError) {
        self.on_failure(ctx, severity, error)
    }
}

/// An observer that fans out callbacks to a list of observers.
#[derive(Default)]
pub struct CompositeObserver {
    observers: Vec<Arc<dyn IngestObserver>>,
}

impl CompositeObserver {
    /// Create a new composite observer from a list of observers.
    pub fn new(observers: Vec<Arc<dyn IngestObserver>>) -> Self {
        Self { observers }
    }
}

impl fmt::Debug for CompositeObserver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeObserver")
            .field("observers_len", &self.observers.len())
            .finish()
    }
}

impl IngestObserver for CompositeObserver {
    fn on_success(&self, ctx: &IngestContext, stats: IngestStats) {
        for o in &self.observers {
            o.on_success(ctx, stats);
        }
    }

    fn on_failure(&self, ctx: &IngestContext, severity: IngestSeverity, error: &PrepError) {
        for o in &self.observers {
            o.on_failure(ctx, severity, error);
        }
    }

    fn on_alert(&self, ctx: &IngestContext, severity: IngestSeverity, error: &PrepError) {
        for o in &self.observers {
            o.on_alert(ctx, severity, error);
        }
    }
}

/// Logs ingestion events to stderr.
#[derive(Debug, Default)]
pub struct StdErrObserver;

impl IngestObserver for StdErrObserver {
    fn on_success(&self, ctx: &IngestContext, stats: IngestStats) {
        eprintln!(
            "[ingest][ok] format={:?} path={} rows={} columns={}",
            ctx.format,
            ctx.path.display(),
            stats.rows,
            stats.columns
        );
    }

    fn on_failure(&self, ctx: &IngestContext, severity: IngestSeverity, error: &PrepError) {
        eprintln!(
            "[ingest][{:?}] format={:?} path={} err={}",
            severity,
            ctx.format,
            ctx.path.display(),
            error
        );
    }

    fn on_alert(&self, ctx: &IngestContext, severity: IngestSeverity, error: &PrepError) {
        eprintln!(
            "[ALERT][ingest][{:?}] format={:?} path={} err={}",
            severity,
            ctx.format,
            ctx.path.display(),
            error
        );
    }
}

/// Appends ingestion events to a local log file.
#[derive(Debug)]
pub struct FileObserver {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileObserver {
    /// Create a file observer that appends events to `path`.
    ///
    /// Writes are best-effort; failures to open/write the log file are
    /// ignored.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            lock: Mutex::new(()),
        }
    }

    fn append_line(&self, line: &str) {
        let _guard = self.lock.lock().ok();
        if let Ok(mut f) = OpenOptions::new().create(true).append(true).open(&self.path) {
            let _ = writeln!(f, "{line}");
        }
    }
}

impl IngestObserver for FileObserver {
    fn on_success(&self, ctx: &IngestContext, stats: IngestStats) {
        self.append_line(&format!(
            "{} ok format={:?} path={} rows={} columns={}",
            unix_ts(),
            ctx.format,
            ctx.path.display(),
            stats.rows,
            stats.columns
        ));
    }

    fn on_failure(&self, ctx: &IngestContext, severity: IngestSeverity, error: &PrepError) {
        self.append_line(&format!(
            "{} fail severity={:?} format={:?} path={} err={}",
            unix_ts(),
            severity,
            ctx.format,
            ctx.path.display(),
            error
        ));
    }

    fn on_alert(&self, ctx: &IngestContext, severity: IngestSeverity, error: &PrepError) {
        self.append_line(&format!(
            "{} ALERT severity={:?} format={:?} path={} err={}",
            unix_ts(),
            severity,
            ctx.format,
            ctx.path.display(),
            error
        ));
    }
}

pub(crate) fn unix_ts() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::{FlightError, FlightResult};

/// Severity classification used for observer callbacks and alerting thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum IngestionSeverity {
    /// Informational event (e.g. a directory with nothing to ingest).
    Info,
    /// Warning-level event (non-fatal).
    Warning,
    /// Error-level event (operation failed).
    Error,
    /// Critical error (typically I/O or other infrastructure failures).
    Critical,
}

/// Context about an ingestion attempt.
#[derive(Debug, Clone)]
pub struct IngestionContext {
    /// The input file being ingested.
    pub path: PathBuf,
}

/// Per-file counts reported when a file was read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngestionStats {
    /// Lines accepted as flight records.
    pub valid_records: usize,
    /// Lines rejected (wrong field count, rule violations, processing errors).
    pub rejected_lines: usize,
}

/// Observer interface for ingestion outcomes.
///
/// Implementors can record metrics, logs, or trigger alerts. Directory ingestion may call
/// observers from worker threads, hence `Send + Sync`.
pub trait IngestionObserver: Send + Sync {
    /// Called when a file was read, whether or not some of its lines were rejected.
    fn on_success(&self, _ctx: &IngestionContext, _stats: IngestionStats) {}

    /// Called when a file could not be read.
    fn on_failure(&self, _ctx: &IngestionContext, _severity: IngestionSeverity, _error: &FlightError) {}

    /// Called when a failure meets an alert threshold.
    ///
    /// Default behavior forwards to [`Self::on_failure`].
    fn on_alert(&self, ctx: &IngestionContext, severity: IngestionSeverity, error: &FlightError) {
        self.on_failure(ctx, severity, error)
    }

    /// Called when directory ingestion found no matching files.
    fn on_no_input(&self, _dir: &Path) {}
}

/// Forwards every callback to each member observer, in insertion order.
#[derive(Default, Clone)]
pub struct CompositeObserver {
    members: Vec<Arc<dyn IngestionObserver>>,
}

impl CompositeObserver {
    pub fn new(members: Vec<Arc<dyn IngestionObserver>>) -> Self {
        Self { members }
    }

    /// Append `observer` to the fan-out list.
    pub fn with(mut self, observer: Arc<dyn IngestionObserver>) -> Self {
        self.members.push(observer);
        self
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

impl fmt::Debug for CompositeObserver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeObserver")
            .field("members", &self.members.len())
            .finish()
    }
}

impl IngestionObserver for CompositeObserver {
    fn on_success(&self, ctx: &IngestionContext, stats: IngestionStats) {
        self.members.iter().for_each(|m| m.on_success(ctx, stats));
    }

    fn on_failure(&self, ctx: &IngestionContext, severity: IngestionSeverity, error: &FlightError) {
        self.members.iter().for_each(|m| m.on_failure(ctx, severity, error));
    }

    fn on_alert(&self, ctx: &IngestionContext, severity: IngestionSeverity, error: &FlightError) {
        self.members.iter().for_each(|m| m.on_alert(ctx, severity, error));
    }

    fn on_no_input(&self, dir: &Path) {
        self.members.iter().for_each(|m| m.on_no_input(dir));
    }
}

/// Emits ingestion events as `tracing` events.
#[derive(Debug, Default)]
pub struct TracingObserver;

impl IngestionObserver for TracingObserver {
    fn on_success(&self, ctx: &IngestionContext, stats: IngestionStats) {
        if stats.rejected_lines > 0 {
            tracing::warn!(
                path = %ctx.path.display(),
                valid = stats.valid_records,
                rejected = stats.rejected_lines,
                "Ingested file with rejected lines"
            );
        } else {
            tracing::info!(
                path = %ctx.path.display(),
                valid = stats.valid_records,
                "Ingested file"
            );
        }
    }

    fn on_failure(&self, ctx: &IngestionContext, severity: IngestionSeverity, error: &FlightError) {
        tracing::error!(
            path = %ctx.path.display(),
            severity = ?severity,
            error = %error,
            "Failed to read input file"
        );
    }

    fn on_alert(&self, ctx: &IngestionContext, severity: IngestionSeverity, error: &FlightError) {
        tracing::error!(
            path = %ctx.path.display(),
            severity = ?severity,
            error = %error,
            alert = true,
            "Failed to read input file"
        );
    }

    fn on_no_input(&self, dir: &Path) {
        tracing::info!(dir = %dir.display(), "No matching input files found");
    }
}

/// Appends one line per ingestion event to an event log.
///
/// Line shapes (`<ts>` is seconds since the unix epoch):
///
/// ```text
/// <ts> ok path=<file> valid=<n> rejected=<m>
/// <ts> fail severity=<sev> path=<file> err=<error>
/// <ts> ALERT severity=<sev> path=<file> err=<error>
/// <ts> empty dir=<dir>
/// ```
#[derive(Debug)]
pub struct FileObserver {
    path: PathBuf,
    file: Mutex<File>,
}

impl FileObserver {
    /// Open (or create) `path` for appending.
    ///
    /// # Errors
    ///
    /// Returns [`FlightError::Io`] if the log file cannot be opened.
    pub fn create(path: impl AsRef<Path>) -> FlightResult<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(Self {
            path,
            file: Mutex::new(file),
        })
    }

    /// Where events are written.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn append(&self, event: &str, detail: fmt::Arguments<'_>) {
        let Ok(mut file) = self.file.lock() else {
            return;
        };
        // Event logging never fails ingestion.
        if let Err(e) = writeln!(file, "{} {event} {detail}", unix_ts()) {
            tracing::debug!(path = %self.path.display(), error = %e, "Event log write failed");
        }
    }
}

impl IngestionObserver for FileObserver {
    fn on_success(&self, ctx: &IngestionContext, stats: IngestionStats) {
        self.append(
            "ok",
            format_args!(
                "path={} valid={} rejected={}",
                ctx.path.display(),
                stats.valid_records,
                stats.rejected_lines
            ),
        );
    }

    fn on_failure(&self, ctx: &IngestionContext, severity: IngestionSeverity, error: &FlightError) {
        self.append(
            "fail",
            format_args!("severity={severity:?} path={} err={error}", ctx.path.display()),
        );
    }

    fn on_alert(&self, ctx: &IngestionContext, severity: IngestionSeverity, error: &FlightError) {
        self.append(
            "ALERT",
            format_args!("severity={severity:?} path={} err={error}", ctx.path.display()),
        );
    }

    fn on_no_input(&self, dir: &Path) {
        self.append("empty", format_args!("dir={}", dir.display()));
    }
}

fn unix_ts() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

//! File and directory ingestion entrypoints.
//!
//! Both entrypoints turn unreadable inputs into report entries instead of errors, so one bad file
//! never stops its siblings from being ingested:
//!
//! - [`ingest_file`] ingests a single delimited file.
//! - [`ingest_directory`] ingests every matching file of a directory (non-recursive) and merges
//!   the results in file-then-line order.
//!
//! If an [`super::observability::IngestionObserver`] is configured, per-file outcomes are reported
//! to it.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use rayon::prelude::*;

use crate::error::{FlightError, FlightResult};

use super::csv;
use super::observability::{IngestionContext, IngestionObserver, IngestionSeverity, IngestionStats};
use super::report::{IngestionReport, SourceError};

/// Options controlling file and directory ingestion.
///
/// Use [`Default`] for common cases.
#[derive(Clone)]
pub struct IngestionOptions {
    /// File extension (without the dot) selected by directory ingestion.
    pub extension: String,
    /// Ingest directory files on the rayon pool. Output order is unchanged.
    pub parallel: bool,
    /// Optional observer for logging/alerts.
    pub observer: Option<Arc<dyn IngestionObserver>>,
    /// Severity threshold at which `on_alert` is invoked.
    pub alert_at_or_above: IngestionSeverity,
}

impl fmt::Debug for IngestionOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IngestionOptions")
            .field("extension", &self.extension)
            .field("parallel", &self.parallel)
            .field("observer_set", &self.observer.is_some())
            .field("alert_at_or_above", &self.alert_at_or_above)
            .finish()
    }
}

impl Default for IngestionOptions {
    fn default() -> Self {
        Self {
            extension: "csv".to_string(),
            parallel: false,
            observer: None,
            alert_at_or_above: IngestionSeverity::Critical,
        }
    }
}

/// Ingest one delimited file.
///
/// A file that cannot be read yields a report with a single source entry
/// (`Error reading file <path>: <detail>`) and no records.
///
/// ```no_run
/// use flight_schedule::ingestion::{ingest_file, IngestionOptions};
///
/// let report = ingest_file("flights.csv", &IngestionOptions::default());
/// println!("{}", report.summary());
/// ```
pub fn ingest_file(path: impl AsRef<Path>, options: &IngestionOptions) -> IngestionReport {
    let path = path.as_ref();
    let ctx = IngestionContext {
        path: path.to_path_buf(),
    };

    match csv::ingest_csv_from_path(path) {
        Ok(report) => {
            if let Some(obs) = options.observer.as_ref() {
                obs.on_success(
                    &ctx,
                    IngestionStats {
                        valid_records: report.valid_count(),
                        rejected_lines: report.error_count(),
                    },
                );
            }
            report
        }
        Err(e) => source_failure(&ctx, e, options),
    }
}

fn source_failure(ctx: &IngestionContext, error: FlightError, options: &IngestionOptions) -> IngestionReport {
    if let Some(obs) = options.observer.as_ref() {
        let sev = severity_for_error(&error);
        obs.on_failure(ctx, sev, &error);
        if sev >= options.alert_at_or_above {
            obs.on_alert(ctx, sev, &error);
        }
    }

    let message = match &error {
        FlightError::Io(io) => io.to_string(),
        other => other.to_string(),
    };
    IngestionReport::from_source_error(SourceError {
        path: ctx.path.clone(),
        message,
    })
}

fn severity_for_error(e: &FlightError) -> IngestionSeverity {
    match e {
        FlightError::Io(_) => IngestionSeverity::Critical,
        _ => IngestionSeverity::Error,
    }
}

/// List the files directory ingestion would read, sorted by path.
///
/// Entries that could not be inspected are returned as errors in their sorted position.
pub fn list_input_files(
    dir: impl AsRef<Path>,
    extension: &str,
) -> FlightResult<Vec<Result<PathBuf, glob::GlobError>>> {
    let dir = dir.as_ref();
    if !dir.is_dir() {
        return Err(FlightError::NotADirectory {
            path: dir.to_path_buf(),
        });
    }

    let escaped = glob::Pattern::escape(&dir.to_string_lossy());
    let pattern = Path::new(&escaped).join(format!("*.{}", glob::Pattern::escape(extension)));
    let entries = glob::glob(&pattern.to_string_lossy())?
        .filter(|entry| match entry {
            Ok(path) => !path.is_dir(),
            Err(_) => true,
        })
        .collect();
    Ok(entries)
}

/// Ingest every matching file of `dir` and merge the reports in file-then-line order.
///
/// - No matching files is not an error: the observer gets `on_no_input` and the report is empty.
/// - A file that cannot be read contributes a single source entry; the other files still run.
/// - With `options.parallel`, files are ingested concurrently; the merged output is identical.
///
/// # Errors
///
/// Returns [`FlightError::NotADirectory`] if `dir` is not a directory.
pub fn ingest_directory(dir: impl AsRef<Path>, options: &IngestionOptions) -> FlightResult<IngestionReport> {
    let dir = dir.as_ref();
    let entries = list_input_files(dir, &options.extension)?;

    if entries.is_empty() {
        if let Some(obs) = options.observer.as_ref() {
            obs.on_no_input(dir);
        }
        return Ok(IngestionReport::new());
    }

    tracing::debug!(dir = %dir.display(), files = entries.len(), "Ingesting directory");

    let per_file: Vec<IngestionReport> = if options.parallel {
        entries
            .into_par_iter()
            .map(|entry| ingest_entry(entry, options))
            .collect()
    } else {
        entries
            .into_iter()
            .map(|entry| ingest_entry(entry, options))
            .collect()
    };

    let mut merged = IngestionReport::new();
    for report in per_file {
        merged.merge(report);
    }
    Ok(merged)
}

fn ingest_entry(entry: Result<PathBuf, glob::GlobError>, options: &IngestionOptions) -> IngestionReport {
    match entry {
        Ok(path) => {
            tracing::debug!(path = %path.display(), "Processing file");
            ingest_file(&path, options)
        }
        Err(e) => {
            let ctx = IngestionContext {
                path: e.path().to_path_buf(),
            };
            source_failure(&ctx, FlightError::Io(std::io::Error::from(e)), options)
        }
    }
}

/// What an [`IngestionRequest`] reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngestionSource {
    File(PathBuf),
    Directory(PathBuf),
}

/// Owned ingestion job: a source plus the options to ingest it with.
#[derive(Clone, Debug)]
pub struct IngestionRequest {
    pub source: IngestionSource,
    pub options: IngestionOptions,
}

impl IngestionRequest {
    /// Execute the request with [`ingest_file`] or [`ingest_directory`].
    pub fn run(&self) -> FlightResult<IngestionReport> {
        match &self.source {
            IngestionSource::File(path) => Ok(ingest_file(path, &self.options)),
            IngestionSource::Directory(dir) => ingest_directory(dir, &self.options),
        }
    }
}

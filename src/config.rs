//! Output locations.
//!
//! Callers pass an [`OutputOptions`] wherever results are written; nothing in the library picks
//! file names on its own.

use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;

/// Where ingestion and query outputs are written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputOptions {
    /// JSON database of valid records.
    pub records_path: PathBuf,
    /// Error log, one rejection per line.
    pub errors_path: PathBuf,
    /// Directory receiving query result files.
    pub results_dir: PathBuf,
    /// File name prefix of query result files.
    pub results_prefix: String,
}

impl Default for OutputOptions {
    fn default() -> Self {
        Self {
            records_path: PathBuf::from("db.json"),
            errors_path: PathBuf::from("errors.txt"),
            results_dir: PathBuf::from("."),
            results_prefix: "response".to_string(),
        }
    }
}

impl OutputOptions {
    /// Path of the query result file for a run started at `at`:
    /// `<results_dir>/<results_prefix>_<YYYYMMDD_HHMM>.json`.
    pub fn results_path(&self, at: NaiveDateTime) -> PathBuf {
        self.results_dir.join(format!(
            "{}_{}.json",
            self.results_prefix,
            at.format("%Y%m%d_%H%M")
        ))
    }

    /// Replace the results directory.
    pub fn with_results_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.results_dir = dir.as_ref().to_path_buf();
        self
    }
}

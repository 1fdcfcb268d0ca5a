//! Ingestion entrypoints and implementations.
//!
//! Most callers should use [`ingest_file`] or [`ingest_directory`] (from [`unified`]) which:
//!
//! - read delimited flight files into an [`IngestionReport`] (valid records + error log)
//! - never fail on malformed lines or unreadable files; those become [`Rejection`] entries
//! - optionally report per-file outcomes to an [`IngestionObserver`]
//!
//! Lower-level pieces are also available under:
//! - [`csv`]: line-level parsing from strings, bytes and readers
//! - [`json`]: loading a persisted flight database

pub mod csv;
pub mod json;
pub mod observability;
pub mod report;
pub mod unified;

pub use csv::{ingest_bytes, ingest_lines, ingest_reader, ingest_str};
pub use json::{load_records_from_path, load_records_from_str};
pub use observability::{
    CompositeObserver, FileObserver, IngestionContext, IngestionObserver, IngestionSeverity, IngestionStats,
    TracingObserver,
};
pub use report::{IngestionReport, IngestionSummary, LineError, LineErrorKind, Rejection, SourceError};
pub use unified::{
    IngestionOptions, IngestionRequest, IngestionSource, ingest_directory, ingest_file, list_input_files,
};

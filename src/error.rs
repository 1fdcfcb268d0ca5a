use std::path::PathBuf;

use thiserror::Error;

use crate::validation::Violation;

/// Convenience result type for fallible library operations.
pub type FlightResult<T> = Result<T, FlightError>;

/// Error type returned by library functions.
///
/// Malformed input *lines* never surface here: ingestion converts them into
/// [`crate::ingestion::Rejection`] entries. This enum covers caller errors and
/// failures of the surrounding I/O (persisted databases, query documents, output files).
#[derive(Debug, Error)]
pub enum FlightError {
    /// Underlying I/O error (e.g. file not found, permission denied).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// Directory enumeration pattern could not be built.
    #[error("glob pattern error: {0}")]
    Pattern(#[from] glob::PatternError),

    /// Directory-mode ingestion was pointed at something that is not a directory.
    #[error("not a directory: {}", .path.display())]
    NotADirectory { path: PathBuf },

    /// A JSON document does not have the expected shape.
    #[error("invalid document: {message}")]
    InvalidDocument { message: String },

    /// A persisted record breaks one or more validation rules.
    #[error("record {index} is invalid: {}", join_violations(.violations))]
    InvalidRecord {
        index: usize,
        violations: Vec<Violation>,
    },

    /// A query comparison value could not be parsed into the type its field requires.
    #[error("failed to parse value in query {query} field '{field}': {message} (raw='{raw}')")]
    InvalidQueryValue {
        query: usize,
        field: String,
        raw: String,
        message: String,
    },
}

fn join_violations(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(Violation::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

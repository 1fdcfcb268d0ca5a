//! Ingestion outcome: the valid record set plus an ordered error log.

use std::fmt;
use std::path::PathBuf;

use crate::types::{FlightDataSet, FlightRecord};
use crate::validation::Violation;

/// Why a single input line was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineErrorKind {
    /// The line did not split into exactly six fields.
    FieldCount { found: usize },
    /// One or more field rules failed, in rule-table order.
    Invalid(Vec<Violation>),
    /// The line could not be processed at all (e.g. it is not UTF-8).
    Processing(String),
}

impl fmt::Display for LineErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LineErrorKind::FieldCount { .. } => f.write_str("incorrect number of fields"),
            LineErrorKind::Invalid(violations) => {
                for (i, v) in violations.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{v}")?;
                }
                Ok(())
            }
            LineErrorKind::Processing(detail) => write!(f, "processing error: {detail}"),
        }
    }
}

/// One rejected input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineError {
    /// 1-based physical line number (comments and blank lines count).
    pub line: usize,
    /// The line as read, with surrounding whitespace trimmed.
    pub text: String,
    pub kind: LineErrorKind,
}

impl LineError {
    /// Rule violations, if this line was rejected by validation.
    pub fn violations(&self) -> &[Violation] {
        match &self.kind {
            LineErrorKind::Invalid(v) => v,
            _ => &[],
        }
    }
}

impl fmt::Display for LineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Line {}: {} → {}", self.line, self.text, self.kind)
    }
}

/// An input source that could not be read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceError {
    pub path: PathBuf,
    pub message: String,
}

impl fmt::Display for SourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Error reading file {}: {}", self.path.display(), self.message)
    }
}

/// One entry of the error log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    Line(LineError),
    Source(SourceError),
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::Line(e) => e.fmt(f),
            Rejection::Source(e) => e.fmt(f),
        }
    }
}

impl From<LineError> for Rejection {
    fn from(e: LineError) -> Self {
        Rejection::Line(e)
    }
}

impl From<SourceError> for Rejection {
    fn from(e: SourceError) -> Self {
        Rejection::Source(e)
    }
}

/// Counts reported once ingestion finishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IngestionSummary {
    pub valid_records: usize,
    pub errors: usize,
}

impl fmt::Display for IngestionSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} valid flights, {} errors",
            self.valid_records, self.errors
        )
    }
}

/// Partitioned result of ingesting one or more sources.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IngestionReport {
    pub records: FlightDataSet,
    pub rejections: Vec<Rejection>,
}

impl IngestionReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// A report holding only a single unreadable-source entry.
    pub fn from_source_error(error: SourceError) -> Self {
        Self {
            records: FlightDataSet::default(),
            rejections: vec![Rejection::Source(error)],
        }
    }

    pub(crate) fn push_record(&mut self, record: FlightRecord) {
        self.records.push(record);
    }

    pub(crate) fn push_rejection(&mut self, rejection: impl Into<Rejection>) {
        self.rejections.push(rejection.into());
    }

    /// Append `other` after this report's records and rejections.
    pub fn merge(&mut self, other: IngestionReport) {
        self.records.extend(other.records);
        self.rejections.extend(other.rejections);
    }

    pub fn valid_count(&self) -> usize {
        self.records.record_count()
    }

    pub fn error_count(&self) -> usize {
        self.rejections.len()
    }

    /// Rejected lines only (source failures excluded).
    pub fn line_errors(&self) -> impl Iterator<Item = &LineError> {
        self.rejections.iter().filter_map(|r| match r {
            Rejection::Line(e) => Some(e),
            Rejection::Source(_) => None,
        })
    }

    /// Error-log lines in report order.
    pub fn error_messages(&self) -> Vec<String> {
        self.rejections.iter().map(Rejection::to_string).collect()
    }

    pub fn summary(&self) -> IngestionSummary {
        IngestionSummary {
            valid_records: self.valid_count(),
            errors: self.error_count(),
        }
    }
}

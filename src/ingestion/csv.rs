//! Delimited flight-line ingestion.
//!
//! Rules:
//!
//! - One flight per line, six comma-separated fields:
//!   `flight_id,origin,destination,departure_datetime,arrival_datetime,price`.
//! - Lines are trimmed; blank lines and lines starting with `#` are skipped.
//! - No quoting or escaping: every `,` separates fields.
//! - Lines end at `\n`, `\r\n` or a lone `\r`.
//! - Line numbers are 1-based and count every physical line.

use std::fs;
use std::io::Read;
use std::path::Path;

use crate::error::FlightResult;
use crate::types::FlightRecord;
use crate::validation::{self, RawFields};

use super::report::{IngestionReport, LineError, LineErrorKind};

/// Ingest a delimited flight file into an [`IngestionReport`].
///
/// I/O failures are returned as errors; use [`super::ingest_file`] to have them recorded as a
/// report entry instead.
pub fn ingest_csv_from_path(path: impl AsRef<Path>) -> FlightResult<IngestionReport> {
    let bytes = fs::read(path)?;
    Ok(ingest_bytes(&bytes))
}

/// Ingest everything `reader` yields.
pub fn ingest_reader<R: Read>(mut reader: R) -> FlightResult<IngestionReport> {
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;
    Ok(ingest_bytes(&bytes))
}

/// Ingest raw bytes. Lines that are not valid UTF-8 are rejected individually.
pub fn ingest_bytes(bytes: &[u8]) -> IngestionReport {
    let mut report = IngestionReport::new();
    for (idx0, raw) in physical_lines(bytes).enumerate() {
        let line_no = idx0 + 1;
        match std::str::from_utf8(raw) {
            Ok(line) => apply_line(&mut report, line_no, line),
            Err(e) => {
                let lossy = String::from_utf8_lossy(raw);
                let text = lossy.trim();
                if is_skipped(text) {
                    continue;
                }
                report.push_rejection(LineError {
                    line: line_no,
                    text: text.to_owned(),
                    kind: LineErrorKind::Processing(e.to_string()),
                });
            }
        }
    }
    report
}

/// Ingest in-memory text.
pub fn ingest_str(text: &str) -> IngestionReport {
    ingest_bytes(text.as_bytes())
}

fn physical_lines(bytes: &[u8]) -> impl Iterator<Item = &[u8]> {
    let mut rest = Some(bytes);
    std::iter::from_fn(move || {
        let current = rest?;
        match current.iter().position(|b| matches!(b, b'\n' | b'\r')) {
            Some(end) => {
                let terminator = if current[end..].starts_with(b"\r\n") { 2 } else { 1 };
                rest = Some(&current[end + terminator..]);
                Some(&current[..end])
            }
            None => {
                rest = None;
                Some(current)
            }
        }
    })
}

/// Ingest a sequence of raw lines; the first item is line 1.
pub fn ingest_lines<I, S>(lines: I) -> IngestionReport
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut report = IngestionReport::new();
    for (idx0, line) in lines.into_iter().enumerate() {
        apply_line(&mut report, idx0 + 1, line.as_ref());
    }
    report
}

fn apply_line(report: &mut IngestionReport, line_no: usize, raw: &str) {
    match parse_line(line_no, raw) {
        Some(Ok(record)) => report.push_record(record),
        Some(Err(e)) => report.push_rejection(e),
        None => {}
    }
}

fn is_skipped(trimmed: &str) -> bool {
    trimmed.is_empty() || trimmed.starts_with('#')
}

/// Parse one raw line. Returns `None` for blank and comment lines.
pub fn parse_line(line_no: usize, raw: &str) -> Option<Result<FlightRecord, LineError>> {
    let line = raw.trim();
    if is_skipped(line) {
        return None;
    }

    let parts: Vec<&str> = line.split(',').collect();
    let Some(fields) = RawFields::from_slice(&parts) else {
        return Some(Err(LineError {
            line: line_no,
            text: line.to_owned(),
            kind: LineErrorKind::FieldCount { found: parts.len() },
        }));
    };

    Some(validation::validate_fields(&fields).map_err(|violations| LineError {
        line: line_no,
        text: line.to_owned(),
        kind: LineErrorKind::Invalid(violations),
    }))
}

//! Loading a persisted flight database.
//!
//! Supported inputs:
//! - A JSON array of record objects (what [`crate::output::save_records`] writes)
//! - A single record object
//! - Newline-delimited JSON (NDJSON), one record per line
//!
//! Every record is validated again on load; a database that breaks a rule is rejected as a whole.

use std::fs;
use std::path::Path;

use crate::error::{FlightError, FlightResult};
use crate::types::{FlightDataSet, FlightRecord, RawFlightRecord};

/// Load a flight database from a JSON file.
pub fn load_records_from_path(path: impl AsRef<Path>) -> FlightResult<FlightDataSet> {
    let text = fs::read_to_string(path)?;
    load_records_from_str(&text)
}

/// Load a flight database from an in-memory JSON string.
pub fn load_records_from_str(input: &str) -> FlightResult<FlightDataSet> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(FlightError::InvalidDocument {
            message: "json input is empty".to_string(),
        });
    }

    // First try parsing as a single JSON value (array or object).
    if let Ok(v) = serde_json::from_str::<serde_json::Value>(trimmed) {
        match v {
            serde_json::Value::Array(items) => records_from_values(items),
            serde_json::Value::Object(_) => records_from_values(vec![v]),
            _ => Err(FlightError::InvalidDocument {
                message: "json must be an object, an array of objects, or NDJSON".to_string(),
            }),
        }
    } else {
        // Fall back to NDJSON.
        let mut values = Vec::new();
        for (i, line) in trimmed.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let v = serde_json::from_str::<serde_json::Value>(line).map_err(|e| {
                FlightError::InvalidDocument {
                    message: format!("invalid ndjson at line {}: {}", i + 1, e),
                }
            })?;
            values.push(v);
        }
        records_from_values(values)
    }
}

fn records_from_values(values: Vec<serde_json::Value>) -> FlightResult<FlightDataSet> {
    let mut records = Vec::with_capacity(values.len());
    for (index, v) in values.into_iter().enumerate() {
        if !v.is_object() {
            return Err(FlightError::InvalidDocument {
                message: format!("record {index} is not a json object"),
            });
        }
        let raw: RawFlightRecord = serde_json::from_value(v)?;
        let record = FlightRecord::try_from(raw)
            .map_err(|violations| FlightError::InvalidRecord { index, violations })?;
        records.push(record);
    }
    Ok(FlightDataSet::new(records))
}

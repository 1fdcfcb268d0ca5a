//! Query documents.
//!
//! A document is either a single field-predicate mapping or an array of them; a single mapping is
//! treated as a batch of one. The whole batch is parsed before any query runs, so one malformed
//! comparison value rejects the batch.

use std::fs;
use std::path::Path;

use serde_json::Value;

use crate::error::{FlightError, FlightResult};

use super::Query;

/// Load a query batch from a JSON file.
pub fn load_queries_from_path(path: impl AsRef<Path>) -> FlightResult<Vec<Query>> {
    let text = fs::read_to_string(path)?;
    load_queries_from_str(&text)
}

/// Load a query batch from an in-memory JSON string.
pub fn load_queries_from_str(input: &str) -> FlightResult<Vec<Query>> {
    let value = serde_json::from_str::<Value>(input)?;
    parse_queries(value)
}

/// Normalize a parsed document into an ordered query batch.
pub fn parse_queries(document: Value) -> FlightResult<Vec<Query>> {
    match document {
        Value::Object(map) => Ok(vec![Query::from_map(0, map)?]),
        Value::Array(items) => items
            .into_iter()
            .enumerate()
            .map(|(index, item)| match item {
                Value::Object(map) => Query::from_map(index, map),
                _ => Err(FlightError::InvalidDocument {
                    message: format!("query {index} is not a json object"),
                }),
            })
            .collect(),
        _ => Err(FlightError::InvalidDocument {
            message: "query document must be an object or an array of objects".to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_mapping_becomes_batch_of_one() {
        let batch = load_queries_from_str(r#"{"origin": "JFK"}"#).unwrap();
        assert_eq!(batch.len(), 1);
        assert_eq!(batch[0].constraints().len(), 1);
    }

    #[test]
    fn array_keeps_input_order() {
        let batch = load_queries_from_str(r#"[{"origin": "JFK"}, {"destination": "LAX"}, {}]"#).unwrap();
        let names: Vec<Vec<&String>> = batch.iter().map(|q| q.source().keys().collect()).collect();
        assert_eq!(names, vec![vec!["origin"], vec!["destination"], vec![]]);
    }

    #[test]
    fn malformed_value_rejects_whole_batch() {
        let err = load_queries_from_str(r#"[{"origin": "JFK"}, {"price": "free"}]"#).unwrap_err();
        assert!(err.to_string().contains("query 1 field 'price'"));
    }

    #[test]
    fn non_object_entries_are_rejected() {
        let err = load_queries_from_str(r#"[{"origin": "JFK"}, "LAX"]"#).unwrap_err();
        assert!(err.to_string().contains("query 1 is not a json object"));
        let err = load_queries_from_str("12").unwrap_err();
        assert!(matches!(err, FlightError::InvalidDocument { .. }));
    }

    #[test]
    fn syntax_errors_are_json_errors() {
        assert!(matches!(load_queries_from_str("{"), Err(FlightError::Json(_))));
    }
}

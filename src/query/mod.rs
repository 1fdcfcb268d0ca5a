//! Filter-style queries over a flight record set.
//!
//! A [`Query`] is a set of per-field [`Constraint`]s combined with logical AND; a field absent
//! from the query is unconstrained. Matching is a linear scan of the record set for every query,
//! and match lists keep the record set's insertion order.
//!
//! | field | a record matches when |
//! |---|---|
//! | `flight_id`, `origin`, `destination` | its value equals the query value |
//! | `departure_datetime` | it departs at or after the query value |
//! | `arrival_datetime` | it arrives at or before the query value |
//! | `price` | its price is at most the query value |
//!
//! ## Example
//!
//! ```rust
//! use flight_schedule::ingestion::ingest_str;
//! use flight_schedule::query::{load_queries_from_str, run_queries};
//!
//! let report = ingest_str("AB12,JFK,LAX,2024-01-01 10:00,2024-01-01 14:00,350.00\n");
//! let queries = load_queries_from_str(r#"[{"origin": "JFK"}, {"price": 300}]"#).unwrap();
//!
//! let results = run_queries(report.records.records(), &queries);
//! assert_eq!(results[0].matches.len(), 1);
//! assert!(results[1].matches.is_empty());
//! ```

pub mod document;

use chrono::NaiveDateTime;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

use crate::error::{FlightError, FlightResult};
use crate::types::{DATETIME_FORMAT, FlightField, FlightRecord};
use crate::validation;

pub use document::{load_queries_from_path, load_queries_from_str, parse_queries};

/// One typed predicate on a single record field.
#[derive(Debug, Clone, PartialEq)]
pub enum Constraint {
    FlightId(String),
    Origin(String),
    Destination(String),
    /// Departs at or after this time.
    DepartsAtOrAfter(NaiveDateTime),
    /// Arrives at or before this time.
    ArrivesAtOrBefore(NaiveDateTime),
    /// Costs at most this much.
    PriceAtMost(f64),
    /// An equality value of a JSON type no record field can hold (e.g. a number for `origin`).
    /// Matches nothing.
    Unmatchable { field: FlightField, value: Value },
}

impl Constraint {
    /// The record field this constraint applies to.
    pub fn field(&self) -> FlightField {
        match self {
            Constraint::FlightId(_) => FlightField::FlightId,
            Constraint::Origin(_) => FlightField::Origin,
            Constraint::Destination(_) => FlightField::Destination,
            Constraint::DepartsAtOrAfter(_) => FlightField::DepartureDatetime,
            Constraint::ArrivesAtOrBefore(_) => FlightField::ArrivalDatetime,
            Constraint::PriceAtMost(_) => FlightField::Price,
            Constraint::Unmatchable { field, .. } => *field,
        }
    }

    pub fn matches(&self, record: &FlightRecord) -> bool {
        match self {
            Constraint::FlightId(v) => record.flight_id() == v,
            Constraint::Origin(v) => record.origin() == v,
            Constraint::Destination(v) => record.destination() == v,
            Constraint::DepartsAtOrAfter(t) => record.departure_datetime() >= *t,
            Constraint::ArrivesAtOrBefore(t) => record.arrival_datetime() <= *t,
            Constraint::PriceAtMost(p) => record.price() <= *p,
            Constraint::Unmatchable { .. } => false,
        }
    }

    /// Parse a query document value for `field`.
    ///
    /// Equality fields compare against a JSON string; any other JSON value yields
    /// [`Constraint::Unmatchable`]. Timestamps need a `YYYY-MM-DD HH:MM` string and `price` a
    /// finite number (a numeric string is accepted too); those are the only parse failures.
    pub fn parse(field: FlightField, value: &Value) -> Result<Self, String> {
        let equality = |build: fn(String) -> Constraint| match value.as_str() {
            Some(s) => build(s.to_owned()),
            None => Constraint::Unmatchable {
                field,
                value: value.clone(),
            },
        };
        match field {
            FlightField::FlightId => Ok(equality(Constraint::FlightId)),
            FlightField::Origin => Ok(equality(Constraint::Origin)),
            FlightField::Destination => Ok(equality(Constraint::Destination)),
            FlightField::DepartureDatetime => parse_query_datetime(value).map(Constraint::DepartsAtOrAfter),
            FlightField::ArrivalDatetime => parse_query_datetime(value).map(Constraint::ArrivesAtOrBefore),
            FlightField::Price => parse_query_price(value).map(Constraint::PriceAtMost),
        }
    }

    fn to_json(&self) -> Value {
        match self {
            Constraint::FlightId(s) | Constraint::Origin(s) | Constraint::Destination(s) => {
                Value::String(s.clone())
            }
            Constraint::DepartsAtOrAfter(t) | Constraint::ArrivesAtOrBefore(t) => {
                Value::String(t.format(DATETIME_FORMAT).to_string())
            }
            Constraint::PriceAtMost(p) => serde_json::Number::from_f64(*p)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            Constraint::Unmatchable { value, .. } => value.clone(),
        }
    }
}

fn parse_query_datetime(value: &Value) -> Result<NaiveDateTime, String> {
    value
        .as_str()
        .and_then(validation::parse_datetime)
        .ok_or_else(|| format!("expected datetime string in format '{DATETIME_FORMAT}'"))
}

fn parse_query_price(value: &Value) -> Result<f64, String> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => validation::parse_price(s),
        _ => None,
    };
    parsed
        .filter(|p| p.is_finite())
        .ok_or_else(|| "expected finite number".to_string())
}

/// A conjunction of field constraints, plus the mapping it was built from.
///
/// Serializes as that mapping, so results can echo the query as the caller wrote it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    source: Map<String, Value>,
    constraints: Vec<Constraint>,
    ignored: Vec<String>,
}

impl Query {
    /// An empty query; it matches every record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `constraint`, replacing any earlier constraint on the same field.
    pub fn and(mut self, constraint: Constraint) -> Self {
        let field = constraint.field();
        self.source.insert(field.name().to_string(), constraint.to_json());
        self.constraints.retain(|c| c.field() != field);
        self.constraints.push(constraint);
        self
    }

    /// Build a query from a document mapping. `index` is the query's position in its batch and
    /// is only used for error reporting.
    ///
    /// Unrecognized field names are ignored; they are listed by [`Self::ignored_fields`].
    ///
    /// # Errors
    ///
    /// Returns [`FlightError::InvalidQueryValue`] if a recognized field has a value of the wrong
    /// type or format.
    pub fn from_map(index: usize, map: Map<String, Value>) -> FlightResult<Self> {
        let mut constraints = Vec::with_capacity(map.len());
        let mut ignored = Vec::new();

        for (name, value) in &map {
            let Some(field) = FlightField::from_name(name) else {
                ignored.push(name.clone());
                continue;
            };
            let constraint = Constraint::parse(field, value).map_err(|message| FlightError::InvalidQueryValue {
                query: index,
                field: name.clone(),
                raw: value.to_string(),
                message,
            })?;
            constraints.push(constraint);
        }

        if !ignored.is_empty() {
            tracing::warn!(query = index, fields = ?ignored, "Ignoring unrecognized query fields");
        }

        Ok(Self {
            source: map,
            constraints,
            ignored,
        })
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    /// Field names present in the source mapping that no constraint corresponds to.
    pub fn ignored_fields(&self) -> &[String] {
        &self.ignored
    }

    /// The mapping this query was built from.
    pub fn source(&self) -> &Map<String, Value> {
        &self.source
    }

    /// `true` if `record` satisfies every constraint.
    pub fn matches(&self, record: &FlightRecord) -> bool {
        self.constraints.iter().all(|c| c.matches(record))
    }
}

impl Serialize for Query {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.source.serialize(serializer)
    }
}

/// A query paired with the records it matched.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryResult {
    pub query: Query,
    pub matches: Vec<FlightRecord>,
}

/// Runs queries against a borrowed record set. The record set is never modified.
#[derive(Debug, Clone, Copy)]
pub struct QueryEngine<'a> {
    records: &'a [FlightRecord],
}

impl<'a> QueryEngine<'a> {
    pub fn new(records: &'a [FlightRecord]) -> Self {
        Self { records }
    }

    /// Records matching `query`, in record-set order.
    pub fn execute_query(&self, query: &Query) -> Vec<FlightRecord> {
        self.records
            .iter()
            .filter(|r| query.matches(r))
            .cloned()
            .collect()
    }

    /// One result per query, in input order.
    pub fn execute_queries(&self, queries: &[Query]) -> Vec<QueryResult> {
        queries
            .iter()
            .map(|query| QueryResult {
                query: query.clone(),
                matches: self.execute_query(query),
            })
            .collect()
    }
}

/// Run a batch of queries against `records`.
pub fn run_queries(records: &[FlightRecord], queries: &[Query]) -> Vec<QueryResult> {
    QueryEngine::new(records).execute_queries(queries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingestion::ingest_str;
    use serde_json::json;

    fn records() -> Vec<FlightRecord> {
        let input = "\
AB12,JFK,LAX,2024-01-01 10:00,2024-01-01 14:00,350.00
CD34,JFK,SFO,2024-01-02 08:00,2024-01-02 11:30,199.99
EF56,ORD,LAX,2024-01-03 18:00,2024-01-03 20:15,120
";
        ingest_str(input).records.into_records()
    }

    fn query(v: Value) -> Query {
        match v {
            Value::Object(map) => Query::from_map(0, map).unwrap(),
            _ => unreachable!(),
        }
    }

    fn ids(matches: &[FlightRecord]) -> Vec<&str> {
        matches.iter().map(FlightRecord::flight_id).collect()
    }

    #[test]
    fn exact_match_fields() {
        let rs = records();
        let engine = QueryEngine::new(&rs);
        assert_eq!(ids(&engine.execute_query(&query(json!({"origin": "JFK"})))), vec!["AB12", "CD34"]);
        assert_eq!(ids(&engine.execute_query(&query(json!({"destination": "LAX"})))), vec!["AB12", "EF56"]);
        assert_eq!(ids(&engine.execute_query(&query(json!({"flight_id": "EF56"})))), vec!["EF56"]);
        assert!(engine.execute_query(&query(json!({"origin": "jfk"}))).is_empty());
    }

    #[test]
    fn range_fields_are_inclusive() {
        let rs = records();
        let engine = QueryEngine::new(&rs);
        let dep = query(json!({"departure_datetime": "2024-01-02 08:00"}));
        assert_eq!(ids(&engine.execute_query(&dep)), vec!["CD34", "EF56"]);

        let arr = query(json!({"arrival_datetime": "2024-01-02 11:30"}));
        assert_eq!(ids(&engine.execute_query(&arr)), vec!["AB12", "CD34"]);

        let price = query(json!({"price": 199.99}));
        assert_eq!(ids(&engine.execute_query(&price)), vec!["CD34", "EF56"]);
    }

    #[test]
    fn price_below_record_does_not_match() {
        let rs = records();
        let q = query(json!({"price": 300, "flight_id": "AB12"}));
        assert!(QueryEngine::new(&rs).execute_query(&q).is_empty());
    }

    #[test]
    fn price_accepts_numeric_string() {
        let q = query(json!({"price": "200"}));
        assert_eq!(q.constraints(), &[Constraint::PriceAtMost(200.0)]);
    }

    #[test]
    fn fields_combine_with_and() {
        let rs = records();
        let q = query(json!({"origin": "JFK", "destination": "LAX", "price": 400}));
        assert_eq!(ids(&QueryEngine::new(&rs).execute_query(&q)), vec!["AB12"]);
    }

    #[test]
    fn empty_query_matches_everything() {
        let rs = records();
        assert_eq!(QueryEngine::new(&rs).execute_query(&Query::new()).len(), 3);
    }

    #[test]
    fn unknown_fields_are_ignored_and_listed() {
        let rs = records();
        let q = query(json!({"airline": "XX", "origin": "ORD"}));
        assert_eq!(q.ignored_fields(), &["airline".to_string()]);
        assert_eq!(ids(&QueryEngine::new(&rs).execute_query(&q)), vec!["EF56"]);
    }

    #[test]
    fn malformed_values_are_errors() {
        for bad in [
            json!({"departure_datetime": "yesterday"}),
            json!({"arrival_datetime": 20240101}),
            json!({"price": "cheap"}),
            json!({"price": null}),
            json!({"price": "inf"}),
        ] {
            let Value::Object(map) = bad else { unreachable!() };
            let err = Query::from_map(2, map).unwrap_err();
            match err {
                FlightError::InvalidQueryValue { query, .. } => assert_eq!(query, 2),
                other => panic!("unexpected error: {other}"),
            }
        }
    }

    #[test]
    fn non_string_equality_value_matches_nothing() {
        let rs = records();
        let engine = QueryEngine::new(&rs);
        for value in [json!(123), json!(null), json!(["JFK"]), json!({"code": "JFK"})] {
            let q = query(json!({ "origin": value.clone() }));
            assert_eq!(
                q.constraints(),
                &[Constraint::Unmatchable {
                    field: FlightField::Origin,
                    value: value.clone(),
                }]
            );
            assert!(engine.execute_query(&q).is_empty());
            assert_eq!(serde_json::to_value(&q).unwrap(), json!({ "origin": value }));
        }
    }

    #[test]
    fn echo_keeps_the_written_key_order() {
        let q: Query = query(serde_json::from_str(r#"{"price": 400, "origin": "JFK", "airline": "XX"}"#).unwrap());
        assert_eq!(
            serde_json::to_string(&q).unwrap(),
            r#"{"price":400,"origin":"JFK","airline":"XX"}"#
        );
    }

    #[test]
    fn builder_replaces_same_field_and_echoes_source() {
        let q = Query::new()
            .and(Constraint::Origin("JFK".to_string()))
            .and(Constraint::PriceAtMost(100.0))
            .and(Constraint::Origin("ORD".to_string()));
        assert_eq!(q.constraints().len(), 2);
        assert_eq!(serde_json::to_value(&q).unwrap(), json!({"origin": "ORD", "price": 100.0}));
    }

    #[test]
    fn results_echo_query_and_keep_input_order() {
        let rs = records();
        let queries = vec![query(json!({"origin": "JFK"})), query(json!({"destination": "LAX"}))];
        let results = run_queries(&rs, &queries);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].query, queries[0]);
        assert_eq!(ids(&results[0].matches), vec!["AB12", "CD34"]);
        assert_eq!(ids(&results[1].matches), vec!["AB12", "EF56"]);

        let v = serde_json::to_value(&results[0]).unwrap();
        assert_eq!(v["query"], json!({"origin": "JFK"}));
        assert_eq!(v["matches"][0]["flight_id"], json!("AB12"));
    }
}

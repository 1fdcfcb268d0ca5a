//! Core data model types.
//!
//! Ingestion produces [`FlightRecord`]s collected in a [`FlightDataSet`]. Records can only be
//! built through validating constructors, so every record in a dataset satisfies the rules in
//! [`crate::validation`].

use std::fmt;

use chrono::{NaiveDateTime, Timelike};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};

use crate::validation::{self, Violation};

/// Text format of departure/arrival timestamps (minute granularity).
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Number of comma-separated fields in one input line.
pub const FIELD_COUNT: usize = 6;

/// A named field of a [`FlightRecord`], in input column order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FlightField {
    /// Carrier flight identifier.
    FlightId,
    /// Origin airport code.
    Origin,
    /// Destination airport code.
    Destination,
    /// Scheduled departure.
    DepartureDatetime,
    /// Scheduled arrival.
    ArrivalDatetime,
    /// Fare.
    Price,
}

impl FlightField {
    /// All fields in input column order.
    pub const ALL: [FlightField; FIELD_COUNT] = [
        FlightField::FlightId,
        FlightField::Origin,
        FlightField::Destination,
        FlightField::DepartureDatetime,
        FlightField::ArrivalDatetime,
        FlightField::Price,
    ];

    /// Field name as used in persisted records and query documents.
    pub fn name(self) -> &'static str {
        match self {
            FlightField::FlightId => "flight_id",
            FlightField::Origin => "origin",
            FlightField::Destination => "destination",
            FlightField::DepartureDatetime => "departure_datetime",
            FlightField::ArrivalDatetime => "arrival_datetime",
            FlightField::Price => "price",
        }
    }

    /// Look up a field by its name (case-sensitive).
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.name() == name)
    }

    /// Position of this field in an input line.
    pub fn column(self) -> usize {
        self as usize
    }
}

impl fmt::Display for FlightField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One validated flight leg.
///
/// Invariants (checked at construction):
///
/// - `flight_id` is 2–8 ASCII alphanumerics
/// - `origin` and `destination` are 3 uppercase ASCII letters
/// - both timestamps are whole minutes and `arrival_datetime > departure_datetime`
/// - `price` is finite and strictly positive
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlightRecord {
    flight_id: String,
    origin: String,
    destination: String,
    #[serde(serialize_with = "serialize_minute")]
    departure_datetime: NaiveDateTime,
    #[serde(serialize_with = "serialize_minute")]
    arrival_datetime: NaiveDateTime,
    price: f64,
}

impl FlightRecord {
    /// Build a record from typed values, collecting every rule the values break.
    pub fn new(
        flight_id: impl Into<String>,
        origin: impl Into<String>,
        destination: impl Into<String>,
        departure_datetime: NaiveDateTime,
        arrival_datetime: NaiveDateTime,
        price: f64,
    ) -> Result<Self, Vec<Violation>> {
        let flight_id = flight_id.into();
        let origin = origin.into();
        let destination = destination.into();

        let violations = typed_violations(
            &flight_id,
            &origin,
            &destination,
            Some(departure_datetime).filter(is_whole_minute),
            Some(arrival_datetime).filter(is_whole_minute),
            price,
        );
        if !violations.is_empty() {
            return Err(violations);
        }

        Ok(Self {
            flight_id,
            origin,
            destination,
            departure_datetime,
            arrival_datetime,
            price,
        })
    }

    /// Construct without checks; callers must have validated every field.
    pub(crate) fn new_unchecked(
        flight_id: String,
        origin: String,
        destination: String,
        departure_datetime: NaiveDateTime,
        arrival_datetime: NaiveDateTime,
        price: f64,
    ) -> Self {
        Self {
            flight_id,
            origin,
            destination,
            departure_datetime,
            arrival_datetime,
            price,
        }
    }

    pub fn flight_id(&self) -> &str {
        &self.flight_id
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    pub fn destination(&self) -> &str {
        &self.destination
    }

    pub fn departure_datetime(&self) -> NaiveDateTime {
        self.departure_datetime
    }

    pub fn arrival_datetime(&self) -> NaiveDateTime {
        self.arrival_datetime
    }

    pub fn price(&self) -> f64 {
        self.price
    }
}

fn is_whole_minute(dt: &NaiveDateTime) -> bool {
    dt.second() == 0 && dt.nanosecond() == 0
}

/// Same rules as the raw-field table, over already-typed values. `None` marks an unusable
/// timestamp; the ordering rule only runs when both are present.
fn typed_violations(
    flight_id: &str,
    origin: &str,
    destination: &str,
    departure: Option<NaiveDateTime>,
    arrival: Option<NaiveDateTime>,
    price: f64,
) -> Vec<Violation> {
    let mut violations = Vec::new();
    if !validation::validate_flight_id(flight_id) {
        violations.push(Violation::InvalidFlightId);
    }
    if !validation::validate_airport_code(origin) {
        violations.push(Violation::InvalidOrigin);
    }
    if !validation::validate_airport_code(destination) {
        violations.push(Violation::InvalidDestination);
    }
    if departure.is_none() {
        violations.push(Violation::InvalidDeparture);
    }
    match (departure, arrival) {
        (_, None) => violations.push(Violation::InvalidArrival),
        (Some(dep), Some(arr)) if arr <= dep => violations.push(Violation::ArrivalBeforeDeparture),
        _ => {}
    }
    if !validation::is_valid_price(price) {
        violations.push(Violation::InvalidPrice);
    }
    violations
}

fn serialize_minute<S>(dt: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.collect_str(&dt.format(DATETIME_FORMAT))
}

/// Persisted shape of a record before validation.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct RawFlightRecord {
    pub flight_id: String,
    pub origin: String,
    pub destination: String,
    pub departure_datetime: String,
    pub arrival_datetime: String,
    pub price: f64,
}

impl TryFrom<RawFlightRecord> for FlightRecord {
    type Error = Vec<Violation>;

    fn try_from(raw: RawFlightRecord) -> Result<Self, Self::Error> {
        let departure = validation::parse_datetime(&raw.departure_datetime);
        let arrival = validation::parse_datetime(&raw.arrival_datetime);

        let violations = typed_violations(
            &raw.flight_id,
            &raw.origin,
            &raw.destination,
            departure,
            arrival,
            raw.price,
        );
        match (departure, arrival) {
            (Some(dep), Some(arr)) if violations.is_empty() => Ok(FlightRecord::new_unchecked(
                raw.flight_id,
                raw.origin,
                raw.destination,
                dep,
                arr,
                raw.price,
            )),
            _ => Err(violations),
        }
    }
}

impl<'de> Deserialize<'de> for FlightRecord {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = RawFlightRecord::deserialize(deserializer)?;
        FlightRecord::try_from(raw).map_err(|violations| {
            D::Error::custom(
                violations
                    .iter()
                    .map(Violation::to_string)
                    .collect::<Vec<_>>()
                    .join(", "),
            )
        })
    }
}

/// In-memory, ordered set of validated flight records.
///
/// Serializes as a plain JSON array of records.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FlightDataSet {
    records: Vec<FlightRecord>,
}

impl FlightDataSet {
    /// Create a dataset from already-validated records.
    pub fn new(records: Vec<FlightRecord>) -> Self {
        Self { records }
    }

    /// Number of records in the dataset.
    pub fn record_count(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records in insertion order.
    pub fn records(&self) -> &[FlightRecord] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FlightRecord> {
        self.records.iter()
    }

    pub fn into_records(self) -> Vec<FlightRecord> {
        self.records
    }

    pub(crate) fn push(&mut self, record: FlightRecord) {
        self.records.push(record);
    }

    /// Append all records of `other`, preserving order.
    pub fn extend(&mut self, other: FlightDataSet) {
        self.records.extend(other.records);
    }
}

impl<'a> IntoIterator for &'a FlightDataSet {
    type Item = &'a FlightRecord;
    type IntoIter = std::slice::Iter<'a, FlightRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

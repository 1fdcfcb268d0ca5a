//! Field-level validation rules for raw flight lines.
//!
//! Every predicate here is pure and total: unparsable input yields `false`, never a panic or an
//! error. [`validate_fields`] evaluates the whole [`RULES`] table against one line so that a
//! single bad line reports every rule it breaks.

use std::fmt;
use std::sync::LazyLock;

use chrono::NaiveDateTime;
use regex::Regex;

use crate::types::{DATETIME_FORMAT, FIELD_COUNT, FlightField, FlightRecord};

static FLIGHT_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9]{2,8}$").expect("flight id pattern is valid"));

static AIRPORT_CODE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z]{3}$").expect("airport code pattern is valid"));

// Shape check before chrono: four-digit year, no surrounding whitespace.
static DATETIME_SHAPE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\d{4}-\d{1,2}-\d{1,2} \d{1,2}:\d{1,2}$").expect("datetime pattern is valid")
});

/// A single failed validation rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Violation {
    InvalidFlightId,
    InvalidOrigin,
    InvalidDestination,
    InvalidDeparture,
    InvalidArrival,
    /// Arrival is not strictly after departure.
    ArrivalBeforeDeparture,
    InvalidPrice,
}

impl Violation {
    /// Human-readable description used in the error log.
    pub fn description(self) -> &'static str {
        match self {
            Violation::InvalidFlightId => "invalid flight_id",
            Violation::InvalidOrigin => "invalid origin code",
            Violation::InvalidDestination => "invalid destination code",
            Violation::InvalidDeparture => "invalid departure datetime",
            Violation::InvalidArrival => "invalid arrival datetime",
            Violation::ArrivalBeforeDeparture => "arrival before departure",
            Violation::InvalidPrice => "invalid price",
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

/// `^[A-Za-z0-9]{2,8}$`
pub fn validate_flight_id(s: &str) -> bool {
    FLIGHT_ID_RE.is_match(s)
}

/// Exactly three uppercase ASCII letters.
pub fn validate_airport_code(s: &str) -> bool {
    AIRPORT_CODE_RE.is_match(s)
}

/// Parse a `YYYY-MM-DD HH:MM` timestamp.
pub fn parse_datetime(s: &str) -> Option<NaiveDateTime> {
    if !DATETIME_SHAPE_RE.is_match(s) {
        return None;
    }
    NaiveDateTime::parse_from_str(s, DATETIME_FORMAT).ok()
}

pub fn validate_datetime(s: &str) -> bool {
    parse_datetime(s).is_some()
}

/// Parse a price; surrounding whitespace is tolerated.
pub fn parse_price(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok()
}

/// Finite and strictly positive.
pub fn is_valid_price(price: f64) -> bool {
    price.is_finite() && price > 0.0
}

pub fn validate_price(s: &str) -> bool {
    parse_price(s).is_some_and(is_valid_price)
}

/// Both timestamps parse and `arrival` is strictly later than `departure`.
pub fn validate_times(departure: &str, arrival: &str) -> bool {
    match (parse_datetime(departure), parse_datetime(arrival)) {
        (Some(dep), Some(arr)) => arr > dep,
        _ => false,
    }
}

/// The six raw fields of one input line, in column order.
#[derive(Debug, Clone, Copy)]
pub struct RawFields<'a>([&'a str; FIELD_COUNT]);

impl<'a> RawFields<'a> {
    pub fn new(fields: [&'a str; FIELD_COUNT]) -> Self {
        Self(fields)
    }

    /// Returns `None` unless `fields` has exactly [`FIELD_COUNT`] entries.
    pub fn from_slice(fields: &[&'a str]) -> Option<Self> {
        <[&str; FIELD_COUNT]>::try_from(fields).ok().map(Self)
    }

    pub fn get(&self, field: FlightField) -> &'a str {
        self.0[field.column()]
    }
}

/// One entry of the rule table: the violation reported when `passes` returns `false`.
#[derive(Clone, Copy)]
pub struct Rule {
    pub violation: Violation,
    pub passes: fn(&RawFields<'_>) -> bool,
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule").field("violation", &self.violation).finish()
    }
}

fn flight_id_rule(f: &RawFields<'_>) -> bool {
    validate_flight_id(f.get(FlightField::FlightId))
}

fn origin_rule(f: &RawFields<'_>) -> bool {
    validate_airport_code(f.get(FlightField::Origin))
}

fn destination_rule(f: &RawFields<'_>) -> bool {
    validate_airport_code(f.get(FlightField::Destination))
}

fn departure_rule(f: &RawFields<'_>) -> bool {
    validate_datetime(f.get(FlightField::DepartureDatetime))
}

fn arrival_rule(f: &RawFields<'_>) -> bool {
    validate_datetime(f.get(FlightField::ArrivalDatetime))
}

// Only judged when both timestamps parse; malformed ones are already reported above.
fn ordering_rule(f: &RawFields<'_>) -> bool {
    let dep = f.get(FlightField::DepartureDatetime);
    let arr = f.get(FlightField::ArrivalDatetime);
    if !validate_datetime(dep) || !validate_datetime(arr) {
        return true;
    }
    validate_times(dep, arr)
}

fn price_rule(f: &RawFields<'_>) -> bool {
    validate_price(f.get(FlightField::Price))
}

/// Every rule a line must pass, in reporting order.
pub const RULES: &[Rule] = &[
    Rule { violation: Violation::InvalidFlightId, passes: flight_id_rule },
    Rule { violation: Violation::InvalidOrigin, passes: origin_rule },
    Rule { violation: Violation::InvalidDestination, passes: destination_rule },
    Rule { violation: Violation::InvalidDeparture, passes: departure_rule },
    Rule { violation: Violation::InvalidArrival, passes: arrival_rule },
    Rule { violation: Violation::ArrivalBeforeDeparture, passes: ordering_rule },
    Rule { violation: Violation::InvalidPrice, passes: price_rule },
];

/// Run every rule (no short-circuit) and return the failures in table order.
pub fn check_fields(fields: &RawFields<'_>) -> Vec<Violation> {
    RULES
        .iter()
        .filter(|rule| !(rule.passes)(fields))
        .map(|rule| rule.violation)
        .collect()
}

/// Validate one line's fields and build the record if every rule passes.
pub fn validate_fields(fields: &RawFields<'_>) -> Result<FlightRecord, Vec<Violation>> {
    let violations = check_fields(fields);
    if !violations.is_empty() {
        return Err(violations);
    }

    let departure = parse_datetime(fields.get(FlightField::DepartureDatetime));
    let arrival = parse_datetime(fields.get(FlightField::ArrivalDatetime));
    let price = parse_price(fields.get(FlightField::Price));
    debug_assert!(
        departure.is_some() && arrival.is_some() && price.is_some(),
        "rule table accepted fields its parsers reject: {fields:?}"
    );
    match (departure, arrival, price) {
        (Some(dep), Some(arr), Some(price)) => Ok(FlightRecord::new_unchecked(
            fields.get(FlightField::FlightId).to_owned(),
            fields.get(FlightField::Origin).to_owned(),
            fields.get(FlightField::Destination).to_owned(),
            dep,
            arr,
            price,
        )),
        (departure, arrival, price) => {
            let parsed = [
                (departure.is_some(), Violation::InvalidDeparture),
                (arrival.is_some(), Violation::InvalidArrival),
                (price.is_some_and(is_valid_price), Violation::InvalidPrice),
            ];
            Err(parsed
                .into_iter()
                .filter(|(ok, _)| !ok)
                .map(|(_, violation)| violation)
                .collect())
        }
    }
}

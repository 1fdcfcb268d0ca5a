//! `flight-schedule` validates delimited flight schedules into an in-memory record set and
//! answers filter-style queries against it.
//!
//! ## Input format
//!
//! One flight per line, six comma-separated fields:
//!
//! ```text
//! # flight_id,origin,destination,departure_datetime,arrival_datetime,price
//! AB12,JFK,LAX,2024-01-01 10:00,2024-01-01 14:00,350.00
//! ```
//!
//! Blank lines and lines starting with `#` are skipped. Every other line either becomes a
//! [`types::FlightRecord`] or an error-log entry listing *all* the rules it breaks:
//!
//! ```text
//! Line 3: X,JFK,LAX,2024-01-01 10:00,2024-01-01 08:00,350.00 → invalid flight_id, arrival before departure
//! ```
//!
//! ## Quick example: ingest and query
//!
//! ```rust
//! use flight_schedule::ingestion::ingest_str;
//! use flight_schedule::query::{load_queries_from_str, run_queries};
//!
//! let report = ingest_str(
//!     "AB12,JFK,LAX,2024-01-01 10:00,2024-01-01 14:00,350.00\n\
//!      X,JFK,LAX,2024-01-01 10:00,2024-01-01 08:00,350.00\n",
//! );
//! assert_eq!(report.valid_count(), 1);
//! assert_eq!(
//!     report.error_messages(),
//!     vec!["Line 2: X,JFK,LAX,2024-01-01 10:00,2024-01-01 08:00,350.00 → invalid flight_id, arrival before departure"]
//! );
//!
//! let queries = load_queries_from_str(r#"[{"origin": "JFK"}, {"destination": "LAX"}]"#).unwrap();
//! let results = run_queries(report.records.records(), &queries);
//! assert_eq!(results.len(), 2);
//! assert_eq!(results[0].matches[0].flight_id(), "AB12");
//! ```
//!
//! ## Directories
//!
//! ```no_run
//! use flight_schedule::ingestion::{ingest_directory, IngestionOptions};
//!
//! # fn main() -> Result<(), flight_schedule::FlightError> {
//! let report = ingest_directory("schedules/", &IngestionOptions::default())?;
//! println!("Parsing complete: {}", report.summary());
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`validation`]: field rules and the rule table
//! - [`ingestion`]: line, file and directory ingestion, database loading, observers
//! - [`query`]: query documents and the matching engine
//! - [`output`]: writing records, error logs and query results
//! - [`config`]: output locations
//! - [`types`]: record and dataset types
//! - [`error`]: error types

pub mod config;
pub mod error;
pub mod ingestion;
pub mod output;
pub mod query;
pub mod types;
pub mod validation;

pub use error::{FlightError, FlightResult};
pub use ingestion::{IngestionReport, ingest_directory, ingest_lines};
pub use query::{Query, QueryResult, run_queries};
pub use types::{FlightDataSet, FlightRecord};

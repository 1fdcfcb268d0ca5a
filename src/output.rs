//! Writing ingestion and query outputs.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::Serialize;

use crate::error::FlightResult;
use crate::ingestion::Rejection;
use crate::query::QueryResult;
use crate::types::FlightRecord;

/// Write records as a pretty-printed JSON array.
pub fn save_records(path: impl AsRef<Path>, records: &[FlightRecord]) -> FlightResult<()> {
    write_json(path.as_ref(), &records)
}

/// Write the error log, one entry per line.
pub fn save_errors(path: impl AsRef<Path>, rejections: &[Rejection]) -> FlightResult<()> {
    let mut w = BufWriter::new(File::create(path)?);
    write_errors(&mut w, rejections)?;
    w.flush()?;
    Ok(())
}

/// Write the error log to any writer.
pub fn write_errors<W: Write>(w: &mut W, rejections: &[Rejection]) -> FlightResult<()> {
    for rejection in rejections {
        writeln!(w, "{rejection}")?;
    }
    Ok(())
}

/// Write query results as a pretty-printed JSON array of `{query, matches}` objects.
pub fn save_query_results(path: impl AsRef<Path>, results: &[QueryResult]) -> FlightResult<()> {
    write_json(path.as_ref(), &results)
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> FlightResult<()> {
    let mut w = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut w, value)?;
    writeln!(w)?;
    w.flush()?;
    Ok(())
}

//! Persistence targets for an assembled [`Series`].
//!
//! Both sinks replace whatever the target held before; a run never appends to
//! an earlier one.

mod csv_sink;
mod sqlite_sink;

use chrono::{DateTime, Utc};
use klines_core::{KlinesError, Series};

pub use csv_sink::{CSV_HEADER, CsvSink};
pub use sqlite_sink::{SQLITE_COLUMNS, SqliteSink};

/// Rendering used for the human-readable timestamp columns.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Something a finished series can be written to.
pub trait SeriesSink {
    /// Short description used in errors and logs, e.g. `csv:data.csv`.
    fn target(&self) -> String;

    /// Write every candle, replacing what the target held before this sink
    /// existed. Returns the row count.
    ///
    /// # Errors
    /// Returns `KlinesError::Sink` on any I/O or storage failure, or if the
    /// sink cannot take another series.
    fn write(&mut self, series: &Series) -> Result<usize, KlinesError>;
}

pub(crate) fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

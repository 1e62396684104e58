use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use klines_core::{KlinesError, Series};

use super::{SeriesSink, format_timestamp};

/// Column names of the CSV output, in order.
pub const CSV_HEADER: [&str; 13] = [
    "open_time",
    "open_price",
    "high_price",
    "low_price",
    "close_price",
    "volume",
    "close_time",
    "quote_volume",
    "n_trades",
    "taker_buy_base_volume",
    "taker_buy_quote_volume",
    "open_timestamp",
    "close_timestamp",
];

/// Writes a series as a comma-separated file with a header row.
///
/// Holds exactly one series: a second `write` on the same sink is rejected
/// instead of appending a second header block.
pub struct CsvSink<W: Write> {
    target: String,
    writer: csv::Writer<W>,
    written: bool,
}

impl CsvSink<File> {
    /// Create (or truncate) the file at `path`.
    ///
    /// # Errors
    /// Returns `KlinesError::Sink` if the file cannot be created.
    pub fn create(path: impl AsRef<Path>) -> Result<Self, KlinesError> {
        let path: PathBuf = path.as_ref().to_path_buf();
        let target = format!("csv:{}", path.display());
        let writer = csv::Writer::from_path(&path)
            .map_err(|e| KlinesError::sink(target.clone(), e.to_string()))?;
        Ok(Self {
            target,
            writer,
            written: false,
        })
    }
}

impl<W: Write> CsvSink<W> {
    /// Write into an arbitrary writer, e.g. a `Vec<u8>` or stdout.
    pub fn from_writer(writer: W) -> Self {
        Self {
            target: "csv:<writer>".to_string(),
            writer: csv::Writer::from_writer(writer),
            written: false,
        }
    }

    /// Flush and return the underlying writer.
    ///
    /// # Errors
    /// Returns `KlinesError::Sink` if flushing fails.
    pub fn into_inner(self) -> Result<W, KlinesError> {
        let target = self.target;
        self.writer
            .into_inner()
            .map_err(|e| KlinesError::sink(target, e.error().to_string()))
    }

    fn err(&self, e: impl ToString) -> KlinesError {
        KlinesError::sink(self.target.clone(), e.to_string())
    }
}

impl<W: Write> SeriesSink for CsvSink<W> {
    fn target(&self) -> String {
        self.target.clone()
    }

    fn write(&mut self, series: &Series) -> Result<usize, KlinesError> {
        if self.written {
            return Err(self.err("series already written; open a new sink to replace it"));
        }
        self.written = true;
        self.writer.write_record(CSV_HEADER).map_err(|e| self.err(e))?;
        for c in series {
            self.writer
                .write_record([
                    c.open_time.to_string(),
                    c.open_price.to_string(),
                    c.high_price.to_string(),
                    c.low_price.to_string(),
                    c.close_price.to_string(),
                    c.volume.to_string(),
                    c.close_time.to_string(),
                    c.quote_volume.to_string(),
                    c.n_trades.to_string(),
                    c.taker_buy_base_volume.to_string(),
                    c.taker_buy_quote_volume.to_string(),
                    format_timestamp(&c.open_timestamp),
                    format_timestamp(&c.close_timestamp),
                ])
                .map_err(|e| self.err(e))?;
        }
        self.writer.flush().map_err(|e| self.err(e))?;
        Ok(series.len())
    }
}

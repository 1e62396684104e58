use std::path::Path;

use rusqlite::{Connection, params};

use klines_core::{KlinesError, Series};

use super::{SeriesSink, format_timestamp};

/// Column definitions of the candle table, in order.
pub const SQLITE_COLUMNS: [(&str, &str); 13] = [
    ("Open_time", "INTEGER"),
    ("Open_price", "REAL"),
    ("High_price", "REAL"),
    ("Low_price", "REAL"),
    ("Close_price", "REAL"),
    ("Volume", "REAL"),
    ("Close_time", "INTEGER"),
    ("Quote_volume", "REAL"),
    ("Number_of_trades", "INTEGER"),
    ("Taker_bb_volume", "REAL"),
    ("Taker_bq_volume", "REAL"),
    ("Open_timestamp", "TEXT"),
    ("Close_timestamp", "TEXT"),
];

/// Writes a series into one SQLite table, dropping any previous table first.
pub struct SqliteSink {
    target: String,
    conn: Connection,
    table: String,
}

impl SqliteSink {
    /// Open (or create) the database at `path` and write into `table`.
    ///
    /// # Errors
    /// Returns `KlinesError::Sink` if the database cannot be opened, or
    /// `InvalidArg` if `table` is not a plain identifier.
    pub fn open(path: impl AsRef<Path>, table: &str) -> Result<Self, KlinesError> {
        let target = format!("sqlite:{}", path.as_ref().display());
        let conn = Connection::open(path.as_ref())
            .map_err(|e| KlinesError::sink(target.clone(), e.to_string()))?;
        Self::with_connection(conn, target, table)
    }

    /// In-memory database, mostly useful in tests.
    ///
    /// # Errors
    /// See [`SqliteSink::open`].
    pub fn in_memory(table: &str) -> Result<Self, KlinesError> {
        let conn = Connection::open_in_memory()
            .map_err(|e| KlinesError::sink("sqlite::memory:", e.to_string()))?;
        Self::with_connection(conn, "sqlite::memory:".to_string(), table)
    }

    fn with_connection(conn: Connection, target: String, table: &str) -> Result<Self, KlinesError> {
        // Interpolated into DDL, so only plain identifiers are accepted.
        let valid = table.chars().next().is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
            && table.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
        if !valid {
            return Err(KlinesError::InvalidArg(format!("invalid table name '{table}'")));
        }
        Ok(Self {
            target,
            conn,
            table: table.to_string(),
        })
    }

    /// The underlying connection, for reading back what was written.
    #[must_use]
    pub const fn connection(&self) -> &Connection {
        &self.conn
    }
}

impl SeriesSink for SqliteSink {
    fn target(&self) -> String {
        format!("{}#{}", self.target, self.table)
    }

    fn write(&mut self, series: &Series) -> Result<usize, KlinesError> {
        let columns = SQLITE_COLUMNS
            .iter()
            .map(|(name, ty)| format!("{name} {ty}"))
            .collect::<Vec<_>>()
            .join(", ");
        let names = SQLITE_COLUMNS
            .iter()
            .map(|(name, _)| *name)
            .collect::<Vec<_>>()
            .join(", ");
        let placeholders = vec!["?"; SQLITE_COLUMNS.len()].join(", ");
        let table = self.table.clone();
        let target = self.target.clone();
        let fail = |e: rusqlite::Error| KlinesError::sink(target.clone(), e.to_string());

        let tx = self.conn.transaction().map_err(&fail)?;
        tx.execute_batch(&format!(
            "DROP TABLE IF EXISTS {table}; CREATE TABLE {table} ({columns});"
        ))
        .map_err(&fail)?;
        {
            let mut stmt = tx
                .prepare(&format!("INSERT INTO {table} ({names}) VALUES ({placeholders})"))
                .map_err(&fail)?;
            for c in series {
                let n_trades = i64::try_from(c.n_trades)
                    .map_err(|_| KlinesError::sink(target.clone(), "trade count exceeds i64"))?;
                stmt.execute(params![
                    c.open_time,
                    c.open_price,
                    c.high_price,
                    c.low_price,
                    c.close_price,
                    c.volume,
                    c.close_time,
                    c.quote_volume,
                    n_trades,
                    c.taker_buy_base_volume,
                    c.taker_buy_quote_volume,
                    format_timestamp(&c.open_timestamp),
                    format_timestamp(&c.close_timestamp),
                ])
                .map_err(&fail)?;
            }
        }
        tx.commit().map_err(&fail)?;
        #[cfg(feature = "tracing")]
        tracing::debug!(sink = %self.target(), rows = series.len(), "sqlite table replaced");
        Ok(series.len())
    }
}

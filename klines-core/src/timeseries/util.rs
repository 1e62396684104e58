//! Shared helpers for trimming and normalizing merged rows.

use chrono::{DateTime, Utc};

use crate::{Candle, KlinesError, RawKline, Timeframe};

/// Drop the last row if the latest reported close time lies strictly after `now`.
///
/// Such a candle is still open upstream and its OHLC values are not final.
/// Returns the dropped row, if any. `rows` must be ascending by open time.
pub fn drop_unclosed_tail(rows: &mut Vec<RawKline>, now: DateTime<Utc>) -> Option<RawKline> {
    let max_close = rows.iter().map(|r| r.close_time).max()?;
    if max_close > now.timestamp_millis() {
        rows.pop()
    } else {
        None
    }
}

/// Convert merged rows into candles, recomputing `close_time` from the
/// timeframe and deriving both timestamps.
///
/// # Errors
/// Returns `Data` if a time cannot be represented as an instant.
pub fn normalize(rows: &[RawKline], timeframe: Timeframe) -> Result<Vec<Candle>, KlinesError> {
    rows.iter().map(|r| Candle::from_raw(r, timeframe)).collect()
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{KlinesError, Timeframe};

/// Number of cells in one kline row on the wire.
const ROW_WIDTH: usize = 12;

/// One kline row as returned by the endpoint, before normalization.
///
/// Wire layout: `[open_time, open, high, low, close, volume, close_time,
/// quote_volume, n_trades, taker_buy_base_volume, taker_buy_quote_volume, ignore]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawKline {
    /// Open time, ms since epoch.
    pub open_time: i64,
    /// Open price.
    pub open: f64,
    /// High price.
    pub high: f64,
    /// Low price.
    pub low: f64,
    /// Close price.
    pub close: f64,
    /// Base asset volume.
    pub volume: f64,
    /// Close time as reported by the source, ms since epoch.
    pub close_time: i64,
    /// Quote asset volume.
    pub quote_volume: f64,
    /// Number of trades.
    pub n_trades: u64,
    /// Taker buy base asset volume.
    pub taker_buy_base_volume: f64,
    /// Taker buy quote asset volume.
    pub taker_buy_quote_volume: f64,
    /// Trailing field the endpoint marks as unused; kept verbatim.
    pub ignore: String,
}

impl RawKline {
    /// Render the row in the endpoint's wire format (decimals as strings).
    #[must_use]
    pub fn to_wire(&self) -> Value {
        Value::Array(vec![
            Value::from(self.open_time),
            Value::from(self.open.to_string()),
            Value::from(self.high.to_string()),
            Value::from(self.low.to_string()),
            Value::from(self.close.to_string()),
            Value::from(self.volume.to_string()),
            Value::from(self.close_time),
            Value::from(self.quote_volume.to_string()),
            Value::from(self.n_trades),
            Value::from(self.taker_buy_base_volume.to_string()),
            Value::from(self.taker_buy_quote_volume.to_string()),
            Value::from(self.ignore.clone()),
        ])
    }
}

fn cell_f64(row: &[Value], idx: usize) -> Result<f64, KlinesError> {
    let v = match &row[idx] {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    v.filter(|x| x.is_finite())
        .ok_or_else(|| KlinesError::Data(format!("kline cell {idx} is not numeric: {}", row[idx])))
}

fn cell_i64(row: &[Value], idx: usize) -> Result<i64, KlinesError> {
    let v = match &row[idx] {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    };
    v.ok_or_else(|| KlinesError::Data(format!("kline cell {idx} is not an integer: {}", row[idx])))
}

impl TryFrom<&Value> for RawKline {
    type Error = KlinesError;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        let row = value
            .as_array()
            .ok_or_else(|| KlinesError::Data(format!("kline row is not an array: {value}")))?;
        if row.len() != ROW_WIDTH {
            return Err(KlinesError::Data(format!(
                "kline row has {} cells, expected {ROW_WIDTH}",
                row.len()
            )));
        }
        let n_trades = u64::try_from(cell_i64(row, 8)?)
            .map_err(|_| KlinesError::Data("negative trade count".into()))?;
        let ignore = match &row[11] {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        Ok(Self {
            open_time: cell_i64(row, 0)?,
            open: cell_f64(row, 1)?,
            high: cell_f64(row, 2)?,
            low: cell_f64(row, 3)?,
            close: cell_f64(row, 4)?,
            volume: cell_f64(row, 5)?,
            close_time: cell_i64(row, 6)?,
            quote_volume: cell_f64(row, 7)?,
            n_trades,
            taker_buy_base_volume: cell_f64(row, 9)?,
            taker_buy_quote_volume: cell_f64(row, 10)?,
            ignore,
        })
    }
}

/// One batch of rows returned by a single fetch, ascending by open time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Page {
    /// Rows in the order the endpoint returned them.
    pub rows: Vec<RawKline>,
}

impl Page {
    /// Wrap rows into a page.
    #[must_use]
    pub const fn new(rows: Vec<RawKline>) -> Self {
        Self { rows }
    }

    /// Parse a JSON array of wire rows.
    ///
    /// # Errors
    /// Returns `Data` if the payload is not an array of well-formed rows.
    pub fn from_wire(value: &Value) -> Result<Self, KlinesError> {
        let rows = value
            .as_array()
            .ok_or_else(|| KlinesError::Data("klines payload is not an array".into()))?
            .iter()
            .map(RawKline::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { rows })
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// True if the page carries no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Earliest reported close time in the page.
    #[must_use]
    pub fn min_close_time(&self) -> Option<i64> {
        self.rows.iter().map(|r| r.close_time).min()
    }
}

impl From<Vec<RawKline>> for Page {
    fn from(rows: Vec<RawKline>) -> Self {
        Self::new(rows)
    }
}

/// One closed OHLCV bar, keyed by `open_time`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    /// Open time, ms since epoch.
    pub open_time: i64,
    /// Open price.
    pub open_price: f64,
    /// High price.
    pub high_price: f64,
    /// Low price.
    pub low_price: f64,
    /// Close price.
    pub close_price: f64,
    /// Base asset volume.
    pub volume: f64,
    /// `open_time + timeframe duration`, ms since epoch.
    pub close_time: i64,
    /// Quote asset volume.
    pub quote_volume: f64,
    /// Number of trades.
    pub n_trades: u64,
    /// Taker buy base asset volume.
    pub taker_buy_base_volume: f64,
    /// Taker buy quote asset volume.
    pub taker_buy_quote_volume: f64,
    /// `open_time` as an instant.
    pub open_timestamp: DateTime<Utc>,
    /// `close_time` as an instant.
    pub close_timestamp: DateTime<Utc>,
}

impl Candle {
    /// Normalize a raw row: recompute `close_time` from the timeframe, derive
    /// both timestamps and drop the unused trailing field.
    ///
    /// # Errors
    /// Returns `Data` if a time falls outside the representable range.
    pub fn from_raw(raw: &RawKline, timeframe: Timeframe) -> Result<Self, KlinesError> {
        let close_time = raw
            .open_time
            .checked_add(timeframe.duration_ms())
            .ok_or_else(|| KlinesError::Data(format!("close time overflow at {}", raw.open_time)))?;
        let instant = |ms: i64| {
            DateTime::<Utc>::from_timestamp_millis(ms)
                .ok_or_else(|| KlinesError::Data(format!("timestamp out of range: {ms}")))
        };
        Ok(Self {
            open_time: raw.open_time,
            open_price: raw.open,
            high_price: raw.high,
            low_price: raw.low,
            close_price: raw.close,
            volume: raw.volume,
            close_time,
            quote_volume: raw.quote_volume,
            n_trades: raw.n_trades,
            taker_buy_base_volume: raw.taker_buy_base_volume,
            taker_buy_quote_volume: raw.taker_buy_quote_volume,
            open_timestamp: instant(raw.open_time)?,
            close_timestamp: instant(close_time)?,
        })
    }
}

/// Ordered, deduplicated candles for one (pair, timeframe) request.
///
/// Candles are ascending by `open_time` with no duplicates; positions are the
/// contiguous index `0..len()`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    /// Trading pair symbol.
    pub pair: String,
    /// Candle width.
    pub timeframe: Timeframe,
    /// The candles.
    pub candles: Vec<Candle>,
}

impl Series {
    /// An empty series for the given request.
    #[must_use]
    pub fn empty(pair: impl Into<String>, timeframe: Timeframe) -> Self {
        Self {
            pair: pair.into(),
            timeframe,
            candles: Vec::new(),
        }
    }

    /// Number of candles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.candles.len()
    }

    /// True if there are no candles.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }

    /// Oldest candle.
    #[must_use]
    pub fn first(&self) -> Option<&Candle> {
        self.candles.first()
    }

    /// Most recent candle.
    #[must_use]
    pub fn last(&self) -> Option<&Candle> {
        self.candles.last()
    }

    /// Iterate candles oldest first.
    pub fn iter(&self) -> std::slice::Iter<'_, Candle> {
        self.candles.iter()
    }

    /// Open times, oldest first.
    #[must_use]
    pub fn open_times(&self) -> Vec<i64> {
        self.candles.iter().map(|c| c.open_time).collect()
    }
}

impl<'a> IntoIterator for &'a Series {
    type Item = &'a Candle;
    type IntoIter = std::slice::Iter<'a, Candle>;

    fn into_iter(self) -> Self::IntoIter {
        self.candles.iter()
    }
}

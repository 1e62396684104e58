//! klines downloads complete candle histories from a capped-page-size klines
//! endpoint and persists them.
//!
//! Overview
//! - Resolves a timeframe token and a per-unit count into a total candle budget.
//! - Pages backward through the registered connector, one request at a time,
//!   until the budget (plus a small safety margin) is spent.
//! - Merges pages by open time, drops the still-open newest candle and
//!   recomputes close times from the timeframe.
//! - Writes the result to CSV and SQLite via [`sink`].
//!
//! Examples
//! ```rust,ignore
//! use std::sync::Arc;
//! use klines::{Klines, sink::{CsvSink, SeriesSink}};
//! use klines_binance::BinanceConnector;
//!
//! let klines = Klines::builder()
//!     .with_connector(Arc::new(BinanceConnector::new_default()?))
//!     .build()?;
//! let series = klines.history("BTCUSDT", "1h", 5).await?;
//! CsvSink::create("data.csv")?.write(&series)?;
//! ```
#![warn(missing_docs)]

pub(crate) mod core;
/// CSV and SQLite persistence for assembled series.
pub mod sink;

pub use core::{Klines, KlinesBuilder};

// Re-export core types for convenience
pub use klines_core::{
    BinanceConfig, Candle, Clock, FixedClock, KlinesConnector, KlinesError, KlinesRequest,
    MAX_PAGE_SIZE, Page, RawKline, Resolution, SAFETY_MARGIN, Series, SinkConfig, SystemClock,
    TimeUnit, Timeframe, resolve,
};

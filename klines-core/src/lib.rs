//! klines-core
//!
//! Connector traits and the algorithm that turns a capped-page-size klines
//! endpoint into one ordered, deduplicated candle series.
//!
//! - `connector`: the `KlinesConnector` trait and its capability role traits.
//! - `assembler`: backward pagination, deduplication and live-candle trimming.
//! - `timeseries`: page merging and normalization helpers used by the assembler.
//! - `clock`: injectable wall clock.
//!
//! Page fetches are awaited one at a time; nothing here spawns tasks.
#![warn(missing_docs)]

/// Backward pagination driver and its explicit state object.
pub mod assembler;
/// Wall-clock abstraction used to detect unclosed candles.
pub mod clock;
/// Connector capability traits and the primary `KlinesConnector` interface.
pub mod connector;
/// Page merging and series normalization.
pub mod timeseries;
pub mod types;

pub use assembler::{Pagination, SAFETY_MARGIN, SeriesAssembler};
pub use clock::{Clock, FixedClock, SystemClock};
pub use connector::KlinesConnector;
pub use timeseries::merge::merge_pages;
pub use timeseries::util::{drop_unclosed_tail, normalize};
pub use types::*;

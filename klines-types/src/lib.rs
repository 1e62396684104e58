//! Candle, page and timeframe types plus configuration primitives shared by the
//! klines crates.
#![warn(missing_docs)]

mod candle;
mod config;
mod connector;
mod error;
mod request;
/// Timeframe tokens (`"1h"`, `"15m"`, ...) and candle-count resolution.
pub mod timeframe;

pub use candle::{Candle, Page, RawKline, Series};
pub use config::{BinanceConfig, SinkConfig};
pub use connector::ConnectorKey;
pub use error::KlinesError;
pub use request::{KlinesRequest, MAX_PAGE_SIZE};
pub use timeframe::{Resolution, TimeUnit, Timeframe, resolve};

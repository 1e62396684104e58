//! Re-export of foundational types from `klines-types`.
// Consolidated re-exports so downstream crates can depend on `klines-core` only

pub use klines_types::timeframe::{Resolution, TimeUnit, Timeframe, resolve};
pub use klines_types::{BinanceConfig, SinkConfig};
pub use klines_types::{Candle, Page, RawKline, Series};
pub use klines_types::{ConnectorKey, KlinesError};
pub use klines_types::{KlinesRequest, MAX_PAGE_SIZE};

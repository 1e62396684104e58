use serde::{Deserialize, Serialize};

use crate::Timeframe;

/// Largest page the klines endpoint serves in one call.
pub const MAX_PAGE_SIZE: u32 = 1_000;

/// One bounded page request against the klines endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KlinesRequest {
    /// Trading pair symbol, e.g. `BTCUSDT`.
    pub pair: String,
    /// Candle width.
    pub timeframe: Timeframe,
    /// Page size, always in `1..=MAX_PAGE_SIZE`.
    pub limit: u32,
    /// Lower bound (ms since epoch) on candle open time.
    pub start_time: Option<i64>,
    /// Upper bound (ms since epoch); only candles at or before it are returned.
    pub end_time: Option<i64>,
}

impl KlinesRequest {
    /// Build a request for the most recent `limit` candles.
    ///
    /// `limit` is clamped into `1..=MAX_PAGE_SIZE`.
    #[must_use]
    pub fn new(pair: impl Into<String>, timeframe: Timeframe, limit: u64) -> Self {
        Self {
            pair: pair.into(),
            timeframe,
            limit: clamp_limit(limit),
            start_time: None,
            end_time: None,
        }
    }

    /// Bound the page above by `end_time` (ms).
    #[must_use]
    pub const fn end_time(mut self, end_time: i64) -> Self {
        self.end_time = Some(end_time);
        self
    }

    /// Bound the page below by `start_time` (ms).
    #[must_use]
    pub const fn start_time(mut self, start_time: i64) -> Self {
        self.start_time = Some(start_time);
        self
    }

    /// The page size actually sent upstream, re-clamped in case the field was
    /// set directly.
    #[must_use]
    pub fn effective_limit(&self) -> u32 {
        clamp_limit(u64::from(self.limit))
    }
}

fn clamp_limit(limit: u64) -> u32 {
    u32::try_from(limit.clamp(1, u64::from(MAX_PAGE_SIZE))).unwrap_or(MAX_PAGE_SIZE)
}

use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use klines_core::connector::{KlinesConnector, PageFetcher, PriceProvider, ServerTimeProvider};
use klines_core::{KlinesError, KlinesRequest, Page};

mod dynamic;
mod fixtures;

pub use dynamic::{MockBehavior, ScriptedConnector, ScriptedController};

/// 2024-01-01T00:00:30Z. Default "now" of the synthetic market.
pub const DEFAULT_ANCHOR_MS: i64 = 1_704_067_230_000;

/// Candles available per timeframe unless overridden.
pub const DEFAULT_HISTORY: usize = 100_000;

/// Mock connector serving a deterministic synthetic market.
///
/// Candles are aligned to the timeframe and end at the anchor instant. With a
/// live tail the newest candle is the one still open at the anchor, so its
/// reported close time lies after it. Pages honor `limit`, `start_time` and an
/// inclusive `end_time` on open time, like the exchange.
///
/// The pair `FAIL` makes every call fail with a fetch error.
pub struct MockConnector {
    anchor_ms: i64,
    history: usize,
    live_tail: bool,
    requests: Mutex<Vec<KlinesRequest>>,
}

impl Default for MockConnector {
    fn default() -> Self {
        Self::new()
    }
}

impl MockConnector {
    /// Connector name used in errors.
    pub const NAME: &'static str = "klines-mock";

    #[must_use]
    pub const fn new() -> Self {
        Self {
            anchor_ms: DEFAULT_ANCHOR_MS,
            history: DEFAULT_HISTORY,
            live_tail: true,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Move the market's "now" to `anchor_ms`.
    #[must_use]
    pub const fn at(mut self, anchor_ms: i64) -> Self {
        self.anchor_ms = anchor_ms;
        self
    }

    /// Limit how many candles exist per timeframe.
    #[must_use]
    pub const fn with_history(mut self, candles: usize) -> Self {
        self.history = candles;
        self
    }

    /// Whether the newest candle is still open at the anchor.
    #[must_use]
    pub const fn with_live_tail(mut self, live: bool) -> Self {
        self.live_tail = live;
        self
    }

    /// The market's "now", ms since epoch.
    #[must_use]
    pub const fn anchor_ms(&self) -> i64 {
        self.anchor_ms
    }

    /// Every page request received so far, in order.
    #[must_use]
    pub fn requests(&self) -> Vec<KlinesRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn maybe_fail(pair: &str, capability: &'static str) -> Result<(), KlinesError> {
        if pair == "FAIL" {
            return Err(KlinesError::fetch(
                Self::NAME,
                format!("forced failure: {capability}"),
            ));
        }
        Ok(())
    }

    /// Open time of the newest candle for a timeframe of `step` ms.
    const fn newest_open(&self, step: i64) -> i64 {
        let current = self.anchor_ms.div_euclid(step) * step;
        if self.live_tail { current } else { current - step }
    }

    fn window(&self, req: &KlinesRequest) -> Vec<i64> {
        let step = req.timeframe.duration_ms();
        let Some(last_idx) = i64::try_from(self.history).ok().and_then(|n| n.checked_sub(1)) else {
            return Vec::new();
        };
        let newest = self.newest_open(step);
        let oldest = newest - last_idx * step;

        let hi = match req.end_time {
            Some(end) if end < oldest => return Vec::new(),
            Some(end) => last_idx.min((end - oldest).div_euclid(step)),
            None => last_idx,
        };
        let lo = match req.start_time {
            Some(start) if start > oldest => (start - oldest + step - 1).div_euclid(step),
            _ => 0,
        };
        if lo > hi {
            return Vec::new();
        }
        let limit = i64::from(req.effective_limit());
        let (from, to) = if req.start_time.is_some() {
            (lo, hi.min(lo + limit - 1))
        } else {
            (lo.max(hi - limit + 1), hi)
        };
        (from..=to).map(|i| oldest + i * step).collect()
    }
}

impl KlinesConnector for MockConnector {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn vendor(&self) -> &'static str {
        "Mock"
    }

    fn as_page_fetcher(&self) -> Option<&dyn PageFetcher> {
        Some(self as &dyn PageFetcher)
    }

    fn as_price_provider(&self) -> Option<&dyn PriceProvider> {
        Some(self as &dyn PriceProvider)
    }

    fn as_server_time_provider(&self) -> Option<&dyn ServerTimeProvider> {
        Some(self as &dyn ServerTimeProvider)
    }
}

#[async_trait]
impl PageFetcher for MockConnector {
    async fn fetch_page(&self, req: KlinesRequest) -> Result<Page, KlinesError> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(req.clone());
        Self::maybe_fail(&req.pair, "klines")?;
        let base = fixtures::prices::base_price(&req.pair);
        let step = req.timeframe.duration_ms();
        Ok(self
            .window(&req)
            .into_iter()
            .map(|t| fixtures::market::row(base, t, step))
            .collect::<Vec<_>>()
            .into())
    }
}

#[async_trait]
impl PriceProvider for MockConnector {
    async fn current_price(&self, pair: &str) -> Result<f64, KlinesError> {
        Self::maybe_fail(pair, "price")?;
        Ok(fixtures::prices::base_price(pair))
    }
}

#[async_trait]
impl ServerTimeProvider for MockConnector {
    async fn server_time(&self) -> Result<i64, KlinesError> {
        Ok(self.anchor_ms)
    }
}

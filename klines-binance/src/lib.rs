//! klines-binance
//!
//! Public connector that implements `KlinesConnector` on top of the Binance
//! spot REST API. Exposes paginated klines, the latest ticker price and the
//! exchange server time. Only unauthenticated market-data endpoints are used.
#![warn(missing_docs)]

/// Adapter definitions and the production adapter backed by `reqwest`.
pub mod adapter;
mod builder;

use std::sync::Arc;

#[cfg(feature = "test-adapters")]
use adapter::CloneArcAdapters;
use adapter::{BinanceKlines, BinanceTicker, BinanceTime, CONNECTOR, RealAdapter};
use async_trait::async_trait;
use klines_core::{
    BinanceConfig, KlinesError, KlinesRequest, Page,
    connector::{ConnectorKey, KlinesConnector, PageFetcher, PriceProvider, ServerTimeProvider},
};
use serde_json::Value;

pub use builder::BinanceConnectorBuilder;

#[cfg(not(feature = "test-adapters"))]
type AdapterArc = Arc<RealAdapter>;

#[cfg(feature = "test-adapters")]
type KlinesAdapter = Arc<dyn BinanceKlines>;
#[cfg(not(feature = "test-adapters"))]
type KlinesAdapter = AdapterArc;

#[cfg(feature = "test-adapters")]
type TickerAdapter = Arc<dyn BinanceTicker>;
#[cfg(not(feature = "test-adapters"))]
type TickerAdapter = AdapterArc;

#[cfg(feature = "test-adapters")]
type TimeAdapter = Arc<dyn BinanceTime>;
#[cfg(not(feature = "test-adapters"))]
type TimeAdapter = AdapterArc;

/// Public connector type. Production users construct it with
/// [`BinanceConnector::from_config`] or [`BinanceConnector::builder`].
pub struct BinanceConnector {
    klines: KlinesAdapter,
    ticker: TickerAdapter,
    time: TimeAdapter,
}

impl BinanceConnector {
    /// Static connector key.
    pub const KEY: ConnectorKey = ConnectorKey::new(CONNECTOR);

    /// Re-tag connector errors raised by adapters under this connector's name.
    fn normalize_error(e: KlinesError) -> KlinesError {
        match e {
            KlinesError::Fetch { connector, msg } if connector != Self::KEY.as_str() => {
                KlinesError::fetch(Self::KEY.as_str(), format!("{connector}: {msg}"))
            }
            other => other,
        }
    }

    /// Build against the public API with default settings.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn new_default() -> Result<Self, KlinesError> {
        Self::from_config(&BinanceConfig::default())
    }

    /// Build from explicit connection settings.
    ///
    /// # Errors
    /// Returns `InvalidArg` for a bad base URL or API key and `Fetch` if the
    /// HTTP client cannot be built.
    pub fn from_config(cfg: &BinanceConfig) -> Result<Self, KlinesError> {
        let a = RealAdapter::new(cfg)?;
        Ok(Self::from_adapter(&a))
    }

    /// Build from a provided `reqwest::Client` pointed at `base_url`.
    ///
    /// # Errors
    /// Returns `InvalidArg` if `base_url` is not an absolute URL.
    pub fn new_with_client(http: reqwest::Client, base_url: &str) -> Result<Self, KlinesError> {
        let a = RealAdapter::with_client(http, base_url)?;
        Ok(Self::from_adapter(&a))
    }

    /// For tests/injection (requires the `test-adapters` feature).
    ///
    /// Accepts a borrowed adapter to avoid unnecessary moves.
    #[cfg(feature = "test-adapters")]
    pub fn from_adapter<A: CloneArcAdapters + 'static>(adapter: &A) -> Self {
        Self {
            klines: adapter.clone_arc_klines(),
            ticker: adapter.clone_arc_ticker(),
            time: adapter.clone_arc_time(),
        }
    }

    #[cfg(not(feature = "test-adapters"))]
    /// Build from a concrete `RealAdapter` by cloning it into shared handles.
    pub fn from_adapter(adapter: &RealAdapter) -> Self {
        let shared = Arc::new(adapter.clone());
        Self {
            klines: Arc::clone(&shared),
            ticker: Arc::clone(&shared),
            time: shared,
        }
    }
}

fn decimal_field(v: &Value, key: &str) -> Option<f64> {
    match v.get(key)? {
        Value::String(s) => s.trim().parse().ok(),
        Value::Number(n) => n.as_f64(),
        _ => None,
    }
}

#[async_trait]
impl PageFetcher for BinanceConnector {
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "klines_binance::fetch_page",
            skip(self, req),
            fields(
                pair = %req.pair,
                interval = %req.timeframe,
                limit = req.effective_limit(),
                end_time = ?req.end_time,
            ),
        )
    )]
    async fn fetch_page(&self, req: KlinesRequest) -> Result<Page, KlinesError> {
        if req.pair.trim().is_empty() {
            return Err(KlinesError::InvalidArg("pair must not be empty".into()));
        }
        let raw = self
            .klines
            .klines(&req)
            .await
            .map_err(Self::normalize_error)?;
        let page = Page::from_wire(&raw)?;
        #[cfg(feature = "tracing")]
        tracing::debug!(rows = page.len(), "klines page received");
        Ok(page)
    }
}

#[async_trait]
impl PriceProvider for BinanceConnector {
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "klines_binance::current_price", skip(self))
    )]
    async fn current_price(&self, pair: &str) -> Result<f64, KlinesError> {
        let raw = self
            .ticker
            .price(pair)
            .await
            .map_err(Self::normalize_error)?;
        decimal_field(&raw, "price")
            .filter(|p| p.is_finite())
            .ok_or_else(|| KlinesError::Data(format!("ticker price for {pair} missing: {raw}")))
    }
}

#[async_trait]
impl ServerTimeProvider for BinanceConnector {
    async fn server_time(&self) -> Result<i64, KlinesError> {
        let raw = self.time.time().await.map_err(Self::normalize_error)?;
        raw.get("serverTime")
            .and_then(Value::as_i64)
            .ok_or_else(|| KlinesError::Data(format!("server time missing: {raw}")))
    }
}

impl KlinesConnector for BinanceConnector {
    fn name(&self) -> &'static str {
        CONNECTOR
    }

    fn vendor(&self) -> &'static str {
        "Binance"
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

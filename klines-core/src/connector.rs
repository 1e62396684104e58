use async_trait::async_trait;

use crate::{KlinesError, KlinesRequest, Page};
pub use klines_types::ConnectorKey;

/// Focused role trait for connectors that serve paginated klines.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetch one page of raw rows, ascending by open time.
    ///
    /// Implementations clamp `req.limit` to `MAX_PAGE_SIZE` and honor
    /// `end_time` as an inclusive upper bound. Failures are returned as
    /// `KlinesError::Fetch` and are never retried here.
    async fn fetch_page(&self, req: KlinesRequest) -> Result<Page, KlinesError>;
}

/// Focused role trait for connectors that provide a latest trade price.
#[async_trait]
pub trait PriceProvider: Send + Sync {
    /// Latest price for `pair`.
    async fn current_price(&self, pair: &str) -> Result<f64, KlinesError>;
}

/// Focused role trait for connectors that expose the exchange clock.
#[async_trait]
pub trait ServerTimeProvider: Send + Sync {
    /// Exchange server time, ms since epoch.
    async fn server_time(&self) -> Result<i64, KlinesError>;
}

/// Primary connector interface. Capabilities are advertised by returning a
/// trait object reference from the matching `as_*` accessor.
pub trait KlinesConnector: Send + Sync {
    /// A stable identifier (e.g., "klines-binance", "klines-mock").
    fn name(&self) -> &'static str;

    /// Canonical connector key constructed from the static name.
    fn key(&self) -> ConnectorKey {
        ConnectorKey::new(self.name())
    }

    /// Human-friendly vendor string.
    fn vendor(&self) -> &'static str {
        "unknown"
    }

    /// Advertise klines capability.
    fn as_page_fetcher(&self) -> Option<&dyn PageFetcher> {
        None
    }

    /// Advertise latest-price capability.
    fn as_price_provider(&self) -> Option<&dyn PriceProvider> {
        None
    }

    /// Advertise server-time capability.
    fn as_server_time_provider(&self) -> Option<&dyn ServerTimeProvider> {
        None
    }
}

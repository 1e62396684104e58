use std::sync::Arc;

use klines_core::{Clock, KlinesConnector, KlinesError, Series, SeriesAssembler, SystemClock};

/// Entry point that resolves a request, drives the registered connector and
/// hands back a finished series.
pub struct Klines {
    pub(crate) connectors: Vec<Arc<dyn KlinesConnector>>,
    pub(crate) clock: Arc<dyn Clock>,
}

/// Builder for constructing a [`Klines`] instance.
pub struct KlinesBuilder {
    connectors: Vec<Arc<dyn KlinesConnector>>,
    clock: Arc<dyn Clock>,
}

impl Default for KlinesBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl KlinesBuilder {
    /// Create a new builder with no connectors and the system clock.
    #[must_use]
    pub fn new() -> Self {
        Self {
            connectors: vec![],
            clock: Arc::new(SystemClock),
        }
    }

    /// Register a connector.
    ///
    /// For each capability the first registered connector that advertises it
    /// is used. There is no fallback to later connectors on failure.
    #[must_use]
    pub fn with_connector(mut self, c: Arc<dyn KlinesConnector>) -> Self {
        self.connectors.push(c);
        self
    }

    /// Replace the clock used to detect the still-open newest candle.
    #[must_use]
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Build the `Klines` instance.
    ///
    /// # Errors
    /// Returns `InvalidArg` if no connectors have been registered via [`with_connector`].
    ///
    /// [`with_connector`]: KlinesBuilder::with_connector
    pub fn build(self) -> Result<Klines, KlinesError> {
        if self.connectors.is_empty() {
            return Err(KlinesError::InvalidArg(
                "no connectors registered; add at least one via with_connector(...)".to_string(),
            ));
        }
        Ok(Klines {
            connectors: self.connectors,
            clock: self.clock,
        })
    }
}

impl Klines {
    /// Start building a new `Klines` instance.
    ///
    /// ```rust,ignore
    /// use std::sync::Arc;
    /// use klines::Klines;
    /// use klines_binance::BinanceConnector;
    ///
    /// let binance = Arc::new(BinanceConnector::new_default()?);
    /// let klines = Klines::builder().with_connector(binance).build()?;
    /// let series = klines.history("BTCUSDT", "1h", 5).await?;
    /// ```
    #[must_use]
    pub fn builder() -> KlinesBuilder {
        KlinesBuilder::new()
    }

    /// Assemble the complete closed-candle history for `pair`.
    ///
    /// `timeframe` is a token such as `1h` or `15m`; `candles_per_unit` scales
    /// the total as described on [`klines_core::resolve`].
    ///
    /// # Errors
    /// - `Unsupported` if no registered connector serves klines.
    /// - Everything [`SeriesAssembler::assemble`] returns.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "klines::history", skip(self))
    )]
    pub async fn history(
        &self,
        pair: &str,
        timeframe: &str,
        candles_per_unit: i64,
    ) -> Result<Series, KlinesError> {
        let (_key, fetcher) = self
            .connectors
            .iter()
            .find_map(|c| c.as_page_fetcher().map(|f| (c.key(), f)))
            .ok_or_else(|| KlinesError::unsupported("klines"))?;
        #[cfg(feature = "tracing")]
        tracing::debug!(connector = %_key, "assembling history");
        let series = SeriesAssembler::new(fetcher, self.clock.as_ref())
            .assemble(pair, timeframe, candles_per_unit)
            .await?;
        #[cfg(feature = "tracing")]
        tracing::info!(candles = series.len(), "history assembled");
        Ok(series)
    }

    /// Latest traded price for `pair`.
    ///
    /// # Errors
    /// `Unsupported` if no connector provides prices, otherwise the connector's error.
    pub async fn current_price(&self, pair: &str) -> Result<f64, KlinesError> {
        let provider = self
            .connectors
            .iter()
            .find_map(|c| c.as_price_provider())
            .ok_or_else(|| KlinesError::unsupported("current_price"))?;
        provider.current_price(pair).await
    }

    /// Exchange server time, ms since epoch.
    ///
    /// # Errors
    /// `Unsupported` if no connector exposes the server clock, otherwise the connector's error.
    pub async fn server_time(&self) -> Result<i64, KlinesError> {
        let provider = self
            .connectors
            .iter()
            .find_map(|c| c.as_server_time_provider())
            .ok_or_else(|| KlinesError::unsupported("server_time"))?;
        provider.server_time().await
    }
}

use std::time::Duration;

use klines_core::{BinanceConfig, KlinesError};

use crate::BinanceConnector;

/// Step-by-step construction of a [`BinanceConnector`].
///
/// Starts from [`BinanceConfig::default`]; customize before calling `.build()`.
#[derive(Debug, Clone, Default)]
pub struct BinanceConnectorBuilder {
    cfg: BinanceConfig,
}

impl BinanceConnector {
    /// Returns a builder seeded with the default configuration.
    #[must_use]
    pub fn builder() -> BinanceConnectorBuilder {
        BinanceConnectorBuilder::default()
    }

    /// Returns a builder seeded from `KLINES_*` environment variables.
    #[must_use]
    pub fn from_env() -> BinanceConnectorBuilder {
        BinanceConnectorBuilder::from_config(BinanceConfig::from_env())
    }
}

impl BinanceConnectorBuilder {
    /// Start from an explicit configuration.
    #[must_use]
    pub const fn from_config(cfg: BinanceConfig) -> Self {
        Self { cfg }
    }

    /// Point the connector at another host (e.g. a local mock server).
    #[must_use]
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.cfg.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Send `X-MBX-APIKEY` with every request.
    #[must_use]
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.cfg.api_key = Some(key.into());
        self
    }

    /// Per-request timeout.
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.cfg.timeout = timeout;
        self
    }

    /// Override the `User-Agent` header.
    #[must_use]
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.cfg.user_agent = ua.into();
        self
    }

    /// The configuration collected so far.
    #[must_use]
    pub const fn config(&self) -> &BinanceConfig {
        &self.cfg
    }

    /// Build the connector.
    ///
    /// # Errors
    /// See [`BinanceConnector::from_config`].
    pub fn build(self) -> Result<BinanceConnector, KlinesError> {
        BinanceConnector::from_config(&self.cfg)
    }
}

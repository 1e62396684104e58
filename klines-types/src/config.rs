//! Configuration types for connectors and sinks.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Connection settings for the Binance spot market-data API.
///
/// Passed to the connector at construction so tests can point it at a local
/// mock server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BinanceConfig {
    /// Scheme and host, without a trailing slash.
    pub base_url: String,
    /// Sent as `X-MBX-APIKEY` when present. Public market data needs none.
    pub api_key: Option<String>,
    /// Per-request timeout.
    pub timeout: Duration,
    /// `User-Agent` header value.
    pub user_agent: String,
}

impl Default for BinanceConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.binance.com".to_string(),
            api_key: None,
            timeout: Duration::from_secs(10),
            user_agent: concat!("klines/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl BinanceConfig {
    /// Defaults overlaid with `KLINES_BASE_URL`, `KLINES_API_KEY` and
    /// `KLINES_TIMEOUT_SECS` from the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::default().overlay(|k| std::env::var(k).ok())
    }

    /// Overlay values from an arbitrary key lookup. Unparseable timeouts are ignored.
    #[must_use]
    pub fn overlay(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(url) = lookup("KLINES_BASE_URL").filter(|s| !s.is_empty()) {
            self.base_url = url.trim_end_matches('/').to_string();
        }
        if let Some(key) = lookup("KLINES_API_KEY").filter(|s| !s.is_empty()) {
            self.api_key = Some(key);
        }
        if let Some(secs) = lookup("KLINES_TIMEOUT_SECS").and_then(|s| s.parse::<u64>().ok()) {
            self.timeout = Duration::from_secs(secs);
        }
        self
    }
}

/// Where the CLI writes the assembled series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SinkConfig {
    /// Delimited flat file.
    pub csv_path: PathBuf,
    /// SQLite database file.
    pub sqlite_path: PathBuf,
    /// Table replaced on every run.
    pub table: String,
}

impl Default for SinkConfig {
    fn default() -> Self {
        Self {
            csv_path: PathBuf::from("data.csv"),
            sqlite_path: PathBuf::from("data.db"),
            table: "Candles".to_string(),
        }
    }
}

impl SinkConfig {
    /// Defaults overlaid with `KLINES_CSV_PATH` and `KLINES_DB_PATH`.
    #[must_use]
    pub fn from_env() -> Self {
        Self::default().overlay(|k| std::env::var(k).ok())
    }

    /// Overlay values from an arbitrary key lookup.
    #[must_use]
    pub fn overlay(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(p) = lookup("KLINES_CSV_PATH").filter(|s| !s.is_empty()) {
            self.csv_path = PathBuf::from(p);
        }
        if let Some(p) = lookup("KLINES_DB_PATH").filter(|s| !s.is_empty()) {
            self.sqlite_path = PathBuf::from(p);
        }
        self
    }
}

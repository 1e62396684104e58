#[cfg(feature = "test-adapters")]
use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use serde_json::Value;
use url::Url;

use klines_core::{BinanceConfig, KlinesError, KlinesRequest};

/// Connector name used in every error raised by this crate.
pub(crate) const CONNECTOR: &str = "klines-binance";

/// Klines endpoint abstraction (so we can inject mocks in tests).
#[async_trait]
pub trait BinanceKlines: Send + Sync {
    /// Fetch one page of raw kline rows as returned on the wire.
    async fn klines(&self, req: &KlinesRequest) -> Result<Value, KlinesError>;
}

/// Ticker endpoint abstraction.
#[async_trait]
pub trait BinanceTicker: Send + Sync {
    /// Fetch the latest price object for `symbol`.
    async fn price(&self, symbol: &str) -> Result<Value, KlinesError>;
}

/// Server clock abstraction.
#[async_trait]
pub trait BinanceTime: Send + Sync {
    /// Fetch the server time object.
    async fn time(&self) -> Result<Value, KlinesError>;
}

/// Real adapter backed by a single `reqwest::Client`.
/// `reqwest::Client` is `Clone + Send + Sync` and pools connections internally.
#[derive(Clone)]
pub struct RealAdapter {
    http: reqwest::Client,
    base: Url,
}

impl RealAdapter {
    /// Build a client from `cfg`.
    ///
    /// # Errors
    /// Returns `InvalidArg` for an unparseable base URL or API key, and `Fetch`
    /// if the HTTP client cannot be built.
    pub fn new(cfg: &BinanceConfig) -> Result<Self, KlinesError> {
        let mut headers = HeaderMap::new();
        if let Some(key) = &cfg.api_key {
            let value = HeaderValue::from_str(key).map_err(|_| {
                KlinesError::InvalidArg("api key is not a valid header value".into())
            })?;
            headers.insert("x-mbx-apikey", value);
        }
        let http = reqwest::Client::builder()
            .user_agent(cfg.user_agent.clone())
            .timeout(cfg.timeout)
            .default_headers(headers)
            .build()
            .map_err(|e| KlinesError::fetch(CONNECTOR, format!("http client: {e}")))?;
        Self::with_client(http, &cfg.base_url)
    }

    /// Wrap an existing `reqwest::Client` pointed at `base_url`.
    ///
    /// # Errors
    /// Returns `InvalidArg` if `base_url` is not an absolute URL.
    pub fn with_client(http: reqwest::Client, base_url: &str) -> Result<Self, KlinesError> {
        let base = Url::parse(base_url)
            .map_err(|e| KlinesError::InvalidArg(format!("base url '{base_url}': {e}")))?;
        Ok(Self { http, base })
    }

    async fn get_json(&self, path: &str, query: &[(&str, String)]) -> Result<Value, KlinesError> {
        let url = self
            .base
            .join(path)
            .map_err(|e| KlinesError::InvalidArg(format!("endpoint {path}: {e}")))?;
        let resp = self
            .http
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|e| map_transport_err(&e, path))?;

        let status = resp.status();
        let body = resp.text().await.map_err(|e| map_transport_err(&e, path))?;
        if !status.is_success() {
            return Err(map_status_err(status.as_u16(), &body, path));
        }
        serde_json::from_str(&body)
            .map_err(|e| KlinesError::Data(format!("{path}: invalid json: {e}")))
    }
}

fn map_transport_err(e: &reqwest::Error, context: &str) -> KlinesError {
    if e.is_timeout() {
        KlinesError::fetch(CONNECTOR, format!("timeout: {context}"))
    } else if e.is_connect() {
        KlinesError::fetch(CONNECTOR, format!("connect: {context}: {e}"))
    } else {
        KlinesError::fetch(CONNECTOR, format!("{context}: {e}"))
    }
}

/// Binance error bodies look like `{"code": -1121, "msg": "Invalid symbol."}`.
fn map_status_err(status: u16, body: &str, context: &str) -> KlinesError {
    let detail = serde_json::from_str::<Value>(body).ok().and_then(|v| {
        let msg = v.get("msg")?.as_str()?.to_string();
        Some(match v.get("code").and_then(Value::as_i64) {
            Some(code) => format!("{msg} (code {code})"),
            None => msg,
        })
    });
    let kind = match status {
        429 | 418 => "rate limit",
        500..=599 => "server error",
        _ => "status",
    };
    match detail {
        Some(d) => KlinesError::fetch(CONNECTOR, format!("{kind} {status}: {context}: {d}")),
        None => KlinesError::fetch(CONNECTOR, format!("{kind} {status}: {context}")),
    }
}

#[async_trait]
impl BinanceKlines for RealAdapter {
    async fn klines(&self, req: &KlinesRequest) -> Result<Value, KlinesError> {
        let mut query = vec![
            ("symbol", req.pair.clone()),
            ("interval", req.timeframe.to_string()),
            ("limit", req.effective_limit().to_string()),
        ];
        if let Some(start) = req.start_time {
            query.push(("startTime", start.to_string()));
        }
        if let Some(end) = req.end_time {
            query.push(("endTime", end.to_string()));
        }
        self.get_json("/api/v3/klines", &query).await
    }
}

#[async_trait]
impl BinanceTicker for RealAdapter {
    async fn price(&self, symbol: &str) -> Result<Value, KlinesError> {
        self.get_json("/api/v3/ticker/price", &[("symbol", symbol.to_string())])
            .await
    }
}

#[async_trait]
impl BinanceTime for RealAdapter {
    async fn time(&self) -> Result<Value, KlinesError> {
        self.get_json("/api/v3/time", &[]).await
    }
}

/* -------- Test-only lightweight adapter constructors ------- */

#[cfg(feature = "test-adapters")]
impl dyn BinanceKlines {
    /// Build a `BinanceKlines` from a closure (tests only).
    pub fn from_fn<F>(f: F) -> Arc<dyn BinanceKlines>
    where
        F: Send + Sync + 'static + Fn(KlinesRequest) -> Result<Value, KlinesError>,
    {
        struct FnKlines<F>(F);
        #[async_trait]
        impl<F> BinanceKlines for FnKlines<F>
        where
            F: Send + Sync + 'static + Fn(KlinesRequest) -> Result<Value, KlinesError>,
        {
            async fn klines(&self, req: &KlinesRequest) -> Result<Value, KlinesError> {
                (self.0)(req.clone())
            }
        }
        Arc::new(FnKlines(f))
    }
}

#[cfg(feature = "test-adapters")]
impl dyn BinanceTicker {
    /// Build a `BinanceTicker` from a closure (tests only).
    pub fn from_fn<F>(f: F) -> Arc<dyn BinanceTicker>
    where
        F: Send + Sync + 'static + Fn(String) -> Result<Value, KlinesError>,
    {
        struct FnTicker<F>(F);
        #[async_trait]
        impl<F> BinanceTicker for FnTicker<F>
        where
            F: Send + Sync + 'static + Fn(String) -> Result<Value, KlinesError>,
        {
            async fn price(&self, symbol: &str) -> Result<Value, KlinesError> {
                (self.0)(symbol.to_string())
            }
        }
        Arc::new(FnTicker(f))
    }
}

#[cfg(feature = "test-adapters")]
impl dyn BinanceTime {
    /// Build a `BinanceTime` from a closure (tests only).
    pub fn from_fn<F>(f: F) -> Arc<dyn BinanceTime>
    where
        F: Send + Sync + 'static + Fn() -> Result<Value, KlinesError>,
    {
        struct FnTime<F>(F);
        #[async_trait]
        impl<F> BinanceTime for FnTime<F>
        where
            F: Send + Sync + 'static + Fn() -> Result<Value, KlinesError>,
        {
            async fn time(&self) -> Result<Value, KlinesError> {
                (self.0)()
            }
        }
        Arc::new(FnTime(f))
    }
}

/// Helper trait to split a concrete adapter into arc trait objects.
///
/// Every method defaults to an adapter that answers `Unsupported`, so tests
/// override only the endpoints they exercise.
#[cfg(feature = "test-adapters")]
pub trait CloneArcAdapters {
    /// Clone as `Arc<dyn BinanceKlines>`.
    fn clone_arc_klines(&self) -> Arc<dyn BinanceKlines> {
        <dyn BinanceKlines>::from_fn(|_| Err(KlinesError::unsupported("klines")))
    }
    /// Clone as `Arc<dyn BinanceTicker>`.
    fn clone_arc_ticker(&self) -> Arc<dyn BinanceTicker> {
        <dyn BinanceTicker>::from_fn(|_| Err(KlinesError::unsupported("ticker/price")))
    }
    /// Clone as `Arc<dyn BinanceTime>`.
    fn clone_arc_time(&self) -> Arc<dyn BinanceTime> {
        <dyn BinanceTime>::from_fn(|| Err(KlinesError::unsupported("time")))
    }
}

#[cfg(feature = "test-adapters")]
impl CloneArcAdapters for RealAdapter {
    fn clone_arc_klines(&self) -> Arc<dyn BinanceKlines> {
        Arc::new(self.clone()) as Arc<dyn BinanceKlines>
    }
    fn clone_arc_ticker(&self) -> Arc<dyn BinanceTicker> {
        Arc::new(self.clone()) as Arc<dyn BinanceTicker>
    }
    fn clone_arc_time(&self) -> Arc<dyn BinanceTime> {
        Arc::new(self.clone()) as Arc<dyn BinanceTime>
    }
}

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Unified error type for the klines workspace.
///
/// Covers timeframe parsing, degenerate requests, connector/transport failures,
/// malformed upstream data and persistence failures.
#[derive(Debug, Error, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum KlinesError {
    /// The requested capability is not implemented by the target connector.
    #[error("unsupported capability: {capability}")]
    Unsupported {
        /// A capability string describing what was requested (e.g. "klines").
        capability: String,
    },

    /// Issues with the returned or expected data (missing fields, etc.).
    #[error("data issue: {0}")]
    Data(String),

    /// Invalid input argument.
    #[error("invalid argument: {0}")]
    InvalidArg(String),

    /// The timeframe token could not be parsed.
    #[error("invalid timeframe '{token}': {reason}")]
    InvalidTimeframe {
        /// The token as supplied by the caller.
        token: String,
        /// What was wrong with it.
        reason: String,
    },

    /// A page request failed at the transport or API level.
    ///
    /// Never retried by the assembler; aborts the in-progress assembly.
    #[error("{connector} fetch failed: {msg}")]
    Fetch {
        /// Connector name that failed.
        connector: String,
        /// Human-readable error message.
        msg: String,
    },

    /// The request resolves to zero or a negative number of candles.
    #[error("request for {requested} candles per unit yields no candles")]
    EmptyRequest {
        /// The requested candle count as supplied.
        requested: i64,
    },

    /// Writing the assembled series to a sink failed.
    #[error("sink {target} failed: {msg}")]
    Sink {
        /// Sink description, e.g. "csv:data.csv".
        target: String,
        /// Human-readable error message.
        msg: String,
    },
}

impl KlinesError {
    /// Helper: build an `Unsupported` error for a capability string.
    #[must_use]
    pub fn unsupported(cap: impl Into<String>) -> Self {
        Self::Unsupported {
            capability: cap.into(),
        }
    }

    /// Helper: build a `Fetch` error with the connector name and message.
    pub fn fetch(connector: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Fetch {
            connector: connector.into(),
            msg: msg.into(),
        }
    }

    /// Helper: build an `InvalidTimeframe` error.
    pub fn invalid_timeframe(token: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidTimeframe {
            token: token.into(),
            reason: reason.into(),
        }
    }

    /// Helper: build a `Sink` error.
    pub fn sink(target: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Sink {
            target: target.into(),
            msg: msg.into(),
        }
    }

    /// Returns true if the error originated from a page/price/time request.
    #[must_use]
    pub const fn is_fetch(&self) -> bool {
        matches!(self, Self::Fetch { .. })
    }
}

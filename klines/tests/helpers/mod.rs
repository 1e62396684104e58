// Re-export helpers so tests can `use helpers::*;`
#![allow(dead_code)]

use chrono::{DateTime, Utc};
use klines_core::{Candle, Series, Timeframe};

/// Common pair constants used across tests.
pub const BTC: &str = "BTCUSDT";
pub const ETH: &str = "ETHUSDT";

/// Construct a UTC `DateTime` from components for readability in tests.
pub fn dt(y: i32, m: u32, d: u32, hh: u32, mm: u32, ss: u32) -> DateTime<Utc> {
    chrono::NaiveDate::from_ymd_opt(y, m, d)
        .and_then(|date| date.and_hms_opt(hh, mm, ss))
        .expect("valid date")
        .and_utc()
}

/// A closed candle with recomputed close time and derived timestamps.
pub fn candle(open_time: i64, tf: Timeframe, close: f64) -> Candle {
    let close_time = open_time + tf.duration_ms();
    Candle {
        open_time,
        open_price: close - 1.0,
        high_price: close + 2.0,
        low_price: close - 3.0,
        close_price: close,
        volume: 10.5,
        close_time,
        quote_volume: 10.5 * close,
        n_trades: 42,
        taker_buy_base_volume: 5.25,
        taker_buy_quote_volume: 5.25 * close,
        open_timestamp: DateTime::from_timestamp_millis(open_time).expect("in range"),
        close_timestamp: DateTime::from_timestamp_millis(close_time).expect("in range"),
    }
}

/// `n` consecutive candles starting at `start`.
pub fn series(pair: &str, token: &str, start: DateTime<Utc>, n: usize) -> Series {
    let tf = Timeframe::parse(token).expect("valid timeframe");
    let step = tf.duration_ms();
    let t0 = start.timestamp_millis();
    Series {
        pair: pair.to_string(),
        timeframe: tf,
        candles: (0..n as i64)
            .map(|i| candle(t0 + i * step, tf, 100.0 + i as f64))
            .collect(),
    }
}

use klines_core::RawKline;

/// Integer mix so the same open time always yields the same row.
const fn mix(mut x: u64) -> u64 {
    x ^= x >> 33;
    x = x.wrapping_mul(0xff51_afd7_ed55_8ccd);
    x ^= x >> 33;
    x = x.wrapping_mul(0xc4ce_b9fe_1a85_ec53);
    x ^ (x >> 33)
}

/// Maps a mixed value into `[-1.0, 1.0)`.
#[allow(clippy::cast_precision_loss)]
fn unit(x: u64) -> f64 {
    (x >> 11) as f64 / (1u64 << 52) as f64 - 1.0
}

/// Build the row for the candle opening at `open_time` with width `step_ms`.
///
/// Values depend only on `(base, open_time, step_ms)`, so overlapping pages
/// return identical boundary rows.
#[allow(clippy::cast_sign_loss, clippy::cast_precision_loss)]
pub fn row(base: f64, open_time: i64, step_ms: i64) -> RawKline {
    let seed = mix(open_time as u64 ^ (step_ms as u64).rotate_left(17));
    let open = base * (1.0 + unit(seed) * 0.01);
    let close = open * (1.0 + unit(mix(seed)) * 0.004);
    let high = open.max(close) * (1.0 + 0.001 + unit(mix(seed ^ 1)).abs() * 0.002);
    let low = open.min(close) * (1.0 - 0.001 - unit(mix(seed ^ 2)).abs() * 0.002);
    let n_trades = 50 + mix(seed ^ 3) % 950;
    let volume = n_trades as f64 * 0.013;
    let taker_base = volume * 0.5 * (1.0 + unit(mix(seed ^ 4)) * 0.2);
    let mid = (open + close) / 2.0;
    RawKline {
        open_time,
        open,
        high,
        low,
        close,
        volume,
        close_time: open_time + step_ms - 1,
        quote_volume: volume * mid,
        n_trades,
        taker_buy_base_volume: taker_base,
        taker_buy_quote_volume: taker_base * mid,
        ignore: "0".to_string(),
    }
}

/// Reference price the synthetic market oscillates around.
pub fn base_price(pair: &str) -> f64 {
    match pair {
        "BTCUSDT" => 65_000.0,
        "ETHUSDT" => 3_200.0,
        "BNBUSDT" => 580.0,
        "SOLUSDT" => 150.0,
        "XRPUSDT" => 0.52,
        _ => 10.0,
    }
}

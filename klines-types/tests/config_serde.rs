use std::collections::HashMap;
use std::time::Duration;

use klines_types::{BinanceConfig, SinkConfig};

#[test]
fn binance_config_roundtrip() {
    let cfg = BinanceConfig {
        base_url: "http://127.0.0.1:9999".into(),
        api_key: Some("k".into()),
        timeout: Duration::from_secs(3),
        user_agent: "test".into(),
    };

    let json = serde_json::to_string(&cfg).expect("serialize binance config");
    let de: BinanceConfig = serde_json::from_str(&json).expect("deserialize binance config");

    assert_eq!(de, cfg);
}

#[test]
fn binance_defaults_use_public_host_without_key() {
    let cfg = BinanceConfig::default();
    assert_eq!(cfg.base_url, "https://api.binance.com");
    assert!(cfg.api_key.is_none());
    assert_eq!(cfg.timeout, Duration::from_secs(10));
}

#[test]
fn binance_overlay_applies_known_keys_only() {
    let env: HashMap<&str, &str> = [
        ("KLINES_BASE_URL", "http://localhost:8080/"),
        ("KLINES_TIMEOUT_SECS", "not-a-number"),
        ("UNRELATED", "x"),
    ]
    .into_iter()
    .collect();
    let cfg = BinanceConfig::default().overlay(|k| env.get(k).map(ToString::to_string));

    assert_eq!(cfg.base_url, "http://localhost:8080");
    assert!(cfg.api_key.is_none());
    assert_eq!(cfg.timeout, Duration::from_secs(10));
}

#[test]
fn sink_overlay_and_defaults() {
    let d = SinkConfig::default();
    assert_eq!(d.csv_path.to_str(), Some("data.csv"));
    assert_eq!(d.sqlite_path.to_str(), Some("data.db"));
    assert_eq!(d.table, "Candles");

    let cfg = SinkConfig::default()
        .overlay(|k| (k == "KLINES_DB_PATH").then(|| "out.db".to_string()));
    assert_eq!(cfg.sqlite_path.to_str(), Some("out.db"));
    assert_eq!(cfg.csv_path.to_str(), Some("data.csv"));
}

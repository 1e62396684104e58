use klines_types::{KlinesError, TimeUnit, Timeframe, resolve};
use proptest::prelude::*;

const UNITS: [(char, u64); 5] = [
    ('s', 1),
    ('m', 60),
    ('h', 3_600),
    ('d', 86_400),
    ('w', 604_800),
];

#[test]
fn one_hour_five_candles() {
    let r = resolve("1h", 5).unwrap();
    assert_eq!(r.duration_seconds, 3_600);
    assert_eq!(r.total_candles_needed, 18_000);
    assert_eq!(r.timeframe.unit(), TimeUnit::Hour);
}

#[test]
fn five_seconds_one_candle() {
    let r = resolve("5s", 1).unwrap();
    assert_eq!(r.duration_seconds, 5);
    assert_eq!(r.total_candles_needed, 5);
}

#[test]
fn multi_digit_multiplier() {
    let tf = Timeframe::parse("15m").unwrap();
    assert_eq!(tf.multiplier(), 15);
    assert_eq!(tf.duration_seconds(), 900);
}

#[test]
fn rejects_malformed_tokens() {
    for bad in ["", "h", "1", "1M", "1y", "xh", "0m", "1hh", "-1h", " 1h"] {
        let err = Timeframe::parse(bad).unwrap_err();
        assert!(
            matches!(err, KlinesError::InvalidTimeframe { .. }),
            "{bad:?} gave {err:?}"
        );
    }
}

#[test]
fn zero_or_negative_count_is_an_empty_request() {
    assert_eq!(
        resolve("1m", 0).unwrap_err(),
        KlinesError::EmptyRequest { requested: 0 }
    );
    assert_eq!(
        resolve("1m", -3).unwrap_err(),
        KlinesError::EmptyRequest { requested: -3 }
    );
}

#[test]
fn invalid_token_is_reported_before_count() {
    assert!(matches!(
        resolve("1q", 0),
        Err(KlinesError::InvalidTimeframe { .. })
    ));
}

#[test]
fn overflowing_product_is_rejected() {
    assert!(matches!(
        resolve("4000000000w", i64::MAX),
        Err(KlinesError::InvalidArg(_))
    ));
}

proptest! {
    #[test]
    fn resolve_matches_formula(mult in 1u32..10_000, unit_idx in 0usize..5, count in 1i64..1_000) {
        let (code, secs) = UNITS[unit_idx];
        let token = format!("{mult}{code}");
        let r = resolve(&token, count).unwrap();
        prop_assert_eq!(r.duration_seconds, u64::from(mult) * secs);
        prop_assert_eq!(r.total_candles_needed, u64::from(mult) * secs * count as u64);
        prop_assert_eq!(r.timeframe.to_string(), token);
    }

    #[test]
    fn unknown_unit_letters_are_rejected(mult in 1u32..100, c in "[a-zA-Z]") {
        prop_assume!(!matches!(c.as_str(), "s" | "m" | "h" | "d" | "w"));
        let token = format!("{mult}{c}");
        let is_invalid_timeframe = matches!(
            Timeframe::parse(&token),
            Err(KlinesError::InvalidTimeframe { .. })
        );
        prop_assert!(is_invalid_timeframe);
    }
}

use std::time::Duration;

use klines_core::connector::KlinesConnector;
use klines_core::{FixedClock, KlinesError, Page, RawKline, SeriesAssembler};
use klines_mock::{MockBehavior, ScriptedConnector};

fn row(open_time: i64) -> RawKline {
    RawKline {
        open_time,
        open: 1.0,
        high: 2.0,
        low: 0.5,
        close: 1.5,
        volume: 10.0,
        close_time: open_time + 59_999,
        quote_volume: 15.0,
        n_trades: 4,
        taker_buy_base_volume: 5.0,
        taker_buy_quote_volume: 7.5,
        ignore: "0".into(),
    }
}

#[tokio::test]
async fn replays_pages_then_runs_dry() {
    let (mock, controller) = ScriptedConnector::new_with_controller("S0");
    controller
        .push_pages([
            Page::new(vec![row(120_000), row(180_000)]),
            Page::new(vec![row(60_000), row(120_000)]),
        ])
        .await;

    let clock = FixedClock::from_millis(10_000_000);
    let asm = SeriesAssembler::new(&*mock, &clock);
    let series = asm.assemble("BTCUSDT", "1h", 1).await.unwrap();

    assert_eq!(series.open_times(), vec![60_000, 120_000, 180_000]);
    let reqs = controller.requests().await;
    // Two scripted pages, then an empty one ends pagination.
    assert_eq!(reqs.len(), 3);
    assert_eq!(reqs[1].end_time, Some(179_999));
    assert_eq!(reqs[2].end_time, Some(119_999));
    assert_eq!(controller.pending().await, 0);
}

#[tokio::test]
async fn scripted_failure_is_returned() {
    let (mock, controller) = ScriptedConnector::new_with_controller("S0");
    controller.push_page(MockBehavior::Return(Page::new(vec![row(0)]))).await;
    controller
        .push_page(MockBehavior::Fail(KlinesError::fetch("S0", "HTTP 418")))
        .await;

    let clock = FixedClock::from_millis(10_000_000);
    let asm = SeriesAssembler::new(&*mock, &clock);
    let err = asm.assemble("BTCUSDT", "1h", 1).await.unwrap_err();
    assert_eq!(err, KlinesError::fetch("S0", "HTTP 418"));
}

#[tokio::test]
async fn hang_can_be_bounded_by_the_caller() {
    let (mock, controller) = ScriptedConnector::new_with_controller("S0");
    controller.push_page(MockBehavior::Hang).await;
    let fetcher = mock.as_page_fetcher().unwrap();
    let req = klines_core::KlinesRequest::new("BTCUSDT", "1m".parse().unwrap(), 10);
    let res = tokio::time::timeout(Duration::from_millis(50), fetcher.fetch_page(req)).await;
    assert!(res.is_err());
}

#[tokio::test]
async fn price_behaviors() {
    let (mock, controller) = ScriptedConnector::new_with_controller("S0");
    let pp = mock.as_price_provider().unwrap();
    assert!(matches!(
        pp.current_price("BTCUSDT").await,
        Err(KlinesError::Unsupported { .. })
    ));
    controller.set_price_behavior(MockBehavior::Return(42.5)).await;
    assert!((pp.current_price("BTCUSDT").await.unwrap() - 42.5).abs() < f64::EPSILON);
    controller.clear_all_behaviors().await;
    assert!(pp.current_price("BTCUSDT").await.is_err());
    assert!(mock.as_server_time_provider().is_none());
}

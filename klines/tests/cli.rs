use assert_cmd::Command;
use predicates::prelude::*;

fn klines_cmd(dir: &tempfile::TempDir) -> Command {
    let mut cmd = Command::cargo_bin("klines").unwrap();
    cmd.env("KLINES_USE_MOCK", "1")
        .env("KLINES_CSV_PATH", dir.path().join("data.csv"))
        .env("KLINES_DB_PATH", dir.path().join("data.db"))
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn downloads_and_persists_with_mock_connector() {
    let dir = tempfile::tempdir().unwrap();
    klines_cmd(&dir)
        .args(["1m", "BTCUSDT"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Current price for BTCUSDT: 65000"))
        .stdout(predicate::str::contains("open_time"))
        .stdout(predicate::str::contains("close_timestamp"));

    let mut rdr = csv::Reader::from_path(dir.path().join("data.csv")).unwrap();
    // 60 candles + margin of 10, all closed against the real clock.
    assert_eq!(rdr.records().count(), 70);

    let conn = rusqlite::Connection::open(dir.path().join("data.db")).unwrap();
    let n: i64 = conn
        .query_row("SELECT COUNT(*) FROM Candles", [], |r| r.get(0))
        .unwrap();
    assert_eq!(n, 70);
}

#[test]
fn explicit_paths_and_count_are_honored() {
    let dir = tempfile::tempdir().unwrap();
    let csv_path = dir.path().join("custom.csv");
    klines_cmd(&dir)
        .args(["5s", "ETHUSDT", "2", "--server-time", "--csv"])
        .arg(&csv_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Server time: "));
    let mut rdr = csv::Reader::from_path(&csv_path).unwrap();
    assert_eq!(rdr.records().count(), 20);
    assert!(!dir.path().join("data.csv").exists());
}

#[test]
fn invalid_timeframe_fails() {
    let dir = tempfile::tempdir().unwrap();
    klines_cmd(&dir)
        .args(["1y", "BTCUSDT"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("InvalidTimeframe"));
    assert!(!dir.path().join("data.db").exists());
}

#[test]
fn non_positive_count_fails() {
    let dir = tempfile::tempdir().unwrap();
    klines_cmd(&dir)
        .args(["1h", "BTCUSDT", "-1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("EmptyRequest"));
}

#[test]
fn fetch_failure_fails() {
    let dir = tempfile::tempdir().unwrap();
    klines_cmd(&dir)
        .args(["1h", "FAIL"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Fetch"));
}

#[test]
fn missing_arguments_is_usage_error() {
    let dir = tempfile::tempdir().unwrap();
    klines_cmd(&dir).arg("1h").assert().failure().code(2);
}

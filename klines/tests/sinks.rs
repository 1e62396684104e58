mod helpers;

use helpers::{BTC, dt, series};
use klines::sink::{CSV_HEADER, CsvSink, SQLITE_COLUMNS, SeriesSink, SqliteSink};
use klines::{KlinesError, Series, Timeframe};

#[test]
fn csv_has_header_and_one_line_per_candle() {
    let s = series(BTC, "1h", dt(2024, 1, 1, 0, 0, 0), 3);
    let mut sink = CsvSink::from_writer(Vec::new());
    assert_eq!(sink.write(&s).unwrap(), 3);
    let text = String::from_utf8(sink.into_inner().unwrap()).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 4);
    assert_eq!(lines[0], CSV_HEADER.join(","));
    assert_eq!(
        lines[1],
        "1704067200000,99,102,97,100,10.5,1704070800000,1050,42,5.25,525,\
         2024-01-01 00:00:00,2024-01-01 01:00:00"
    );
    assert!(lines[3].ends_with("2024-01-01 02:00:00,2024-01-01 03:00:00"));
}

#[test]
fn csv_file_is_replaced_on_each_run() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("data.csv");
    let big = series(BTC, "1m", dt(2024, 1, 1, 0, 0, 0), 10);
    let small = series(BTC, "1m", dt(2024, 1, 1, 0, 0, 0), 2);

    CsvSink::create(&path).unwrap().write(&big).unwrap();
    CsvSink::create(&path).unwrap().write(&small).unwrap();

    let mut rdr = csv::Reader::from_path(&path).unwrap();
    let header: Vec<String> = rdr.headers().unwrap().iter().map(str::to_string).collect();
    assert_eq!(header, CSV_HEADER);
    assert_eq!(rdr.records().count(), 2);
}

#[test]
fn csv_sink_refuses_a_second_series() {
    let first = series(BTC, "1h", dt(2024, 1, 1, 0, 0, 0), 3);
    let second = series(BTC, "1h", dt(2024, 2, 1, 0, 0, 0), 2);
    let mut sink = CsvSink::from_writer(Vec::new());
    sink.write(&first).unwrap();

    let err = sink.write(&second).unwrap_err();
    assert!(matches!(err, KlinesError::Sink { .. }));

    let text = String::from_utf8(sink.into_inner().unwrap()).unwrap();
    assert_eq!(text.lines().count(), 4);
    assert_eq!(text.matches("open_time,").count(), 1);
}

#[test]
fn csv_to_missing_directory_is_a_sink_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = CsvSink::create(dir.path().join("nope").join("data.csv"))
        .err()
        .expect("error");
    assert!(matches!(err, KlinesError::Sink { .. }));
}

#[test]
fn sqlite_table_has_expected_columns_and_rows() {
    let s = series(BTC, "4h", dt(2024, 3, 1, 0, 0, 0), 5);
    let mut sink = SqliteSink::in_memory("Candles").unwrap();
    assert_eq!(sink.write(&s).unwrap(), 5);

    let conn = sink.connection();
    let mut stmt = conn.prepare("PRAGMA table_info(Candles)").unwrap();
    let cols: Vec<(String, String)> = stmt
        .query_map([], |r| Ok((r.get(1)?, r.get(2)?)))
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();
    let expected: Vec<(String, String)> = SQLITE_COLUMNS
        .iter()
        .map(|(n, t)| ((*n).to_string(), (*t).to_string()))
        .collect();
    assert_eq!(cols, expected);

    let (count, first_open, first_ts, last_close): (i64, i64, String, i64) = conn
        .query_row(
            "SELECT COUNT(*), MIN(Open_time), MIN(Open_timestamp), MAX(Close_time) FROM Candles",
            [],
            |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?, r.get(3)?)),
        )
        .unwrap();
    assert_eq!(count, 5);
    assert_eq!(first_open, dt(2024, 3, 1, 0, 0, 0).timestamp_millis());
    assert_eq!(first_ts, "2024-03-01 00:00:00");
    assert_eq!(last_close, dt(2024, 3, 1, 20, 0, 0).timestamp_millis());
}

#[test]
fn sqlite_write_replaces_previous_table() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("data.db");
    let first = series(BTC, "1d", dt(2024, 1, 1, 0, 0, 0), 7);
    let second = series(BTC, "1d", dt(2024, 2, 1, 0, 0, 0), 3);

    SqliteSink::open(&path, "Candles").unwrap().write(&first).unwrap();
    let mut sink = SqliteSink::open(&path, "Candles").unwrap();
    sink.write(&second).unwrap();

    let opens: Vec<i64> = {
        let mut stmt = sink
            .connection()
            .prepare("SELECT Open_time FROM Candles ORDER BY Open_time")
            .unwrap();
        stmt.query_map([], |r| r.get(0))
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap()
    };
    assert_eq!(opens, second.open_times());
}

#[test]
fn empty_series_still_creates_the_table() {
    let s = Series::empty(BTC, Timeframe::parse("1m").unwrap());
    let mut sink = SqliteSink::in_memory("Candles").unwrap();
    assert_eq!(sink.write(&s).unwrap(), 0);
    let n: i64 = sink
        .connection()
        .query_row("SELECT COUNT(*) FROM Candles", [], |r| r.get(0))
        .unwrap();
    assert_eq!(n, 0);
}

#[test]
fn table_names_must_be_identifiers() {
    for bad in ["", "1abc", "Candles; DROP TABLE x", "a-b"] {
        assert!(
            matches!(SqliteSink::in_memory(bad), Err(KlinesError::InvalidArg(_))),
            "{bad:?} accepted"
        );
    }
    assert!(SqliteSink::in_memory("candles_1h").is_ok());
}

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use klines::sink::{CsvSink, SeriesSink, SqliteSink, TIMESTAMP_FORMAT};
use klines::{Candle, Klines, KlinesConnector, SinkConfig};
use klines_binance::BinanceConnector;
use klines_mock::MockConnector;
use tracing_subscriber::EnvFilter;

/// Download the complete closed-candle history for a pair and store it as CSV and SQLite.
#[derive(Parser, Debug)]
#[command(name = "klines", version)]
struct Cli {
    /// Candle width: a positive integer followed by s, m, h, d or w (e.g. 1h, 15m).
    timeframe: String,

    /// Trading pair symbol, e.g. BTCUSDT.
    pair: String,

    /// Candles per unit; the total is timeframe seconds times this value.
    #[arg(default_value_t = 1, allow_negative_numbers = true)]
    candles_per_unit: i64,

    /// CSV output path (overrides KLINES_CSV_PATH).
    #[arg(long)]
    csv: Option<PathBuf>,

    /// SQLite output path (overrides KLINES_DB_PATH).
    #[arg(long)]
    db: Option<PathBuf>,

    /// Also print the exchange server time.
    #[arg(long)]
    server_time: bool,
}

fn connector() -> Result<Arc<dyn KlinesConnector>, Box<dyn std::error::Error>> {
    if std::env::var("KLINES_USE_MOCK").is_ok_and(|v| !v.is_empty()) {
        return Ok(Arc::new(MockConnector::new()));
    }
    Ok(Arc::new(BinanceConnector::from_env().build()?))
}

fn print_candle(c: &Candle) {
    println!("open_time               {}", c.open_time);
    println!("open_price              {}", c.open_price);
    println!("high_price              {}", c.high_price);
    println!("low_price               {}", c.low_price);
    println!("close_price             {}", c.close_price);
    println!("volume                  {}", c.volume);
    println!("close_time              {}", c.close_time);
    println!("quote_volume            {}", c.quote_volume);
    println!("n_trades                {}", c.n_trades);
    println!("taker_buy_base_volume   {}", c.taker_buy_base_volume);
    println!("taker_buy_quote_volume  {}", c.taker_buy_quote_volume);
    let opened = c.open_timestamp.format(TIMESTAMP_FORMAT);
    let closed = c.close_timestamp.format(TIMESTAMP_FORMAT);
    println!("open_timestamp          {opened}");
    println!("close_timestamp         {closed}");
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut sinks = SinkConfig::from_env();
    if let Some(p) = cli.csv {
        sinks.csv_path = p;
    }
    if let Some(p) = cli.db {
        sinks.sqlite_path = p;
    }

    let klines = Klines::builder().with_connector(connector()?).build()?;

    if cli.server_time {
        println!("Server time: {}", klines.server_time().await?);
    }
    println!(
        "Current price for {}: {}",
        cli.pair,
        klines.current_price(&cli.pair).await?
    );

    let series = klines
        .history(&cli.pair, &cli.timeframe, cli.candles_per_unit)
        .await?;

    match series.first() {
        Some(first) => {
            println!(
                "An example of OHLCV data stored in {} and {}:",
                sinks.csv_path.display(),
                sinks.sqlite_path.display()
            );
            print_candle(first);
        }
        None => println!("No closed candles available for {}", cli.pair),
    }

    let csv_rows = CsvSink::create(&sinks.csv_path)?.write(&series)?;
    let db_rows = SqliteSink::open(&sinks.sqlite_path, &sinks.table)?.write(&series)?;
    #[cfg(feature = "tracing")]
    tracing::info!(csv_rows, db_rows, "series persisted");
    #[cfg(not(feature = "tracing"))]
    let _ = (csv_rows, db_rows);
    Ok(())
}

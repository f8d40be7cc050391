#![allow(clippy::collapsible_if)]
#![allow(clippy::collapsible_else_if)]

// Core modules
pub mod analysis;
pub mod config;
pub mod data;
pub mod domain;
pub mod engine;
pub mod utils;

// Re-export commonly used types
pub use analysis::{Horizon, Strategy, StrategyKind, StrategySignal, predict};
pub use config::WorkerConfig;
pub use data::{BinanceKlineSource, MarketDataSource, ReplaySource};
pub use domain::{PairInterval, Prediction, PredictionParameters, PricePoint, Signal, Trade};
pub use engine::{AnalysisReport, PositionTracker, Worker, WorkerError, WorkerManager};

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
// CLI argument parsing
use clap::{Parser, Subcommand};

use crate::utils::TimeUtils;
use crate::utils::time_utils::epoch_ms_to_utc;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Run one monitoring worker per symbol until Ctrl+C
    Monitor {
        /// Binance symbols, e.g. BTCUSDT ETHUSDT
        #[arg(required = true)]
        symbols: Vec<String>,

        /// Stop on our own after this many seconds
        #[arg(long)]
        run_for_secs: Option<u64>,
    },
    /// Fetch the latest window once and print a single prediction
    Predict {
        symbol: String,

        /// Candle width in Binance shorthand (1m, 5m, 1h, 1d...)
        #[arg(long, default_value = "1h", value_parser = parse_timeframe)]
        timeframe: i64,

        /// Print the prediction as JSON
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Entry levels of a ladder strategy (grid, dca) around the latest price
    Signals {
        strategy: StrategyKind,
        symbol: String,

        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Rough profit outlook of a ladder strategy
    Profit {
        strategy: StrategyKind,

        /// Amount invested, in quote currency
        #[arg(long)]
        investment: f64,

        /// short or long
        #[arg(long, default_value = "long")]
        horizon: Horizon,

        #[arg(long, default_value_t = false)]
        json: bool,
    },
}

fn parse_timeframe(text: &str) -> std::result::Result<i64, String> {
    TimeUtils::interval_from_string(text).ok_or_else(|| format!("unknown timeframe '{}'", text))
}

/// Main application entry point.
/// This is the public API for the binary to call
pub async fn run_app(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Monitor {
            symbols,
            run_for_secs,
        } => monitor(binance_source()?, &symbols, run_for_secs).await,
        Command::Predict {
            symbol,
            timeframe,
            json,
        } => predict_once(binance_source()?.as_ref(), &symbol, timeframe, json).await,
        Command::Signals {
            strategy,
            symbol,
            json,
        } => show_signals(binance_source()?.as_ref(), strategy, &symbol, json).await,
        Command::Profit {
            strategy,
            investment,
            horizon,
            json,
        } => show_profit(strategy, investment, horizon, json),
    }
}

fn binance_source() -> Result<Arc<dyn MarketDataSource>> {
    let source = BinanceKlineSource::new().context("Failed to configure the Binance client")?;
    Ok(Arc::new(source))
}

async fn monitor(
    source: Arc<dyn MarketDataSource>,
    symbols: &[String],
    run_for_secs: Option<u64>,
) -> Result<()> {
    let manager = WorkerManager::new(source, WorkerConfig::default());

    for symbol in symbols {
        if let Err(e) = manager.start_worker(&symbol.to_uppercase()) {
            log::warn!("{}", e);
        }
    }
    log::info!("--- Monitoring {:?}. Press Ctrl+C to stop. ---", manager.status());

    let deadline = async {
        match run_for_secs {
            Some(secs) => tokio::time::sleep(Duration::from_secs(secs)).await,
            None => std::future::pending::<()>().await,
        }
    };

    tokio::select! {
        signal = tokio::signal::ctrl_c() => {
            signal.context("Failed to listen for Ctrl+C")?;
            log::info!("Ctrl+C received, shutting down");
        }
        _ = deadline => log::info!("Run time elapsed, shutting down"),
    }

    manager.shutdown().await;
    Ok(())
}

/// Newest-first window for `pair_interval`, never empty.
async fn latest_window(
    source: &dyn MarketDataSource,
    pair_interval: &PairInterval,
) -> Result<Vec<PricePoint>> {
    let window = source
        .fetch(pair_interval)
        .await
        .with_context(|| format!("Failed to fetch {} from {}", pair_interval, source.signature()))?;
    if window.is_empty() {
        anyhow::bail!("{} returned no prices for {}", source.signature(), pair_interval);
    }
    Ok(window)
}

fn prediction_line(pair_interval: &PairInterval, prediction: &Prediction, as_of_ms: i64) -> String {
    format!(
        "{} @ {} -> Signal: {} | Price: {:.4} | Confidence: {:.2}% | {}",
        pair_interval,
        epoch_ms_to_utc(as_of_ms),
        prediction.signal.to_string().to_uppercase(),
        prediction.price,
        prediction.confidence * 100.0,
        prediction.reason.as_deref().unwrap_or(""),
    )
}

fn strategy_signal_line(signal: &StrategySignal) -> String {
    format!(
        "  | {:<4} @ {:<12.4} | TP: {:<12.4} | SL: {:<12.4} | {}",
        signal.signal.to_string().to_uppercase(),
        signal.price,
        signal.take_profit,
        signal.stop_loss,
        signal.horizon,
    )
}

async fn predict_once(
    source: &dyn MarketDataSource,
    symbol: &str,
    timeframe: i64,
    json: bool,
) -> Result<()> {
    let pair_interval = PairInterval::new(symbol.to_uppercase(), timeframe);
    let window = latest_window(source, &pair_interval).await?;

    let prediction = predict(pair_interval.name(), &window, &config::ANALYSIS.prediction);

    if json {
        println!("{}", serde_json::to_string_pretty(&prediction)?);
    } else {
        println!("{}", prediction_line(&pair_interval, &prediction, window[0].timestamp_ms));
    }
    Ok(())
}

async fn show_signals(
    source: &dyn MarketDataSource,
    kind: StrategyKind,
    symbol: &str,
    json: bool,
) -> Result<()> {
    let pair_interval = PairInterval::new(symbol.to_uppercase(), TimeUtils::MS_IN_MIN);
    let latest = latest_window(source, &pair_interval).await?[0];

    let strategy = kind.build();
    let signals = strategy.signals(latest.price);

    if json {
        println!("{}", serde_json::to_string_pretty(&signals)?);
    } else {
        println!(
            "{} for {} at {:.4} ({})",
            strategy,
            pair_interval.name(),
            latest.price,
            epoch_ms_to_utc(latest.timestamp_ms)
        );
        for signal in &signals {
            println!("{}", strategy_signal_line(signal));
        }
    }
    Ok(())
}

fn show_profit(kind: StrategyKind, investment: f64, horizon: Horizon, json: bool) -> Result<()> {
    let strategy = kind.build();
    let outlook = strategy.profit_prediction(investment, horizon);

    if json {
        println!("{}", serde_json::to_string_pretty(&outlook)?);
    } else {
        println!(
            "{} on {:.2} ({} term): {:.2} ({:.2}%)",
            strategy, investment, horizon, outlook.profit, outlook.percentage
        );
    }
    Ok(())
}

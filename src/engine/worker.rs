use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use super::error::WorkerError;
use super::messages::AnalysisReport;
use super::positions::PositionTracker;
use crate::analysis::predict;
use crate::config::{DEBUG_FLAGS, TimeframeSchedule, WorkerConfig};
use crate::data::MarketDataSource;
use crate::domain::{PairInterval, PredictionParameters};

/// Resolves once the worker is cancelled, or once the cancelling side is gone.
async fn cancelled(cancel: &mut watch::Receiver<bool>) {
    let _ = cancel.wait_for(|&is_cancelled| is_cancelled).await;
}

/// Periodic analysis of one (symbol, timeframe).
struct AnalysisTask {
    pair_interval: PairInterval,
    poll_period: Duration,
    params: PredictionParameters,
    source: Arc<dyn MarketDataSource>,
    positions: Arc<PositionTracker>,
    reports: broadcast::Sender<AnalysisReport>,
}

impl AnalysisTask {
    async fn run(self, mut cancel: watch::Receiver<bool>) {
        // Ticker semantics: first cycle one period after start, late ticks dropped
        let mut ticker = tokio::time::interval_at(Instant::now() + self.poll_period, self.poll_period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                biased;
                _ = cancelled(&mut cancel) => break,
                // An in-flight cycle always completes before cancellation is looked at again
                _ = ticker.tick() => self.run_cycle().await,
            }
        }

        if DEBUG_FLAGS.print_worker_lifecycle {
            log::info!("Analysis task for {} cancelled", self.pair_interval);
        }
    }

    async fn run_cycle(&self) {
        let start = Instant::now();
        let timeframe = self.pair_interval.timeframe();

        let outcome = match self.source.fetch(&self.pair_interval).await {
            Ok(window) => Ok(predict(self.pair_interval.name(), &window, &self.params)),
            Err(e) => Err(WorkerError::DataFetchFailed {
                pair: self.pair_interval.to_string(),
                reason: format!("{:#}", e),
            }),
        };

        match &outcome {
            Ok(prediction) => {
                if DEBUG_FLAGS.print_analysis_cycles {
                    log::info!(
                        "  | {} {:<4} -> Signal: {:<4} | Price: {:<12.4} | Confidence: {:.2}%",
                        self.pair_interval.name(),
                        timeframe,
                        prediction.signal.to_string().to_uppercase(),
                        prediction.price,
                        prediction.confidence * 100.0,
                    );
                }
                if DEBUG_FLAGS.print_prediction_reasons {
                    if let Some(reason) = &prediction.reason {
                        log::info!("  | {} {:<4} -> {}", self.pair_interval.name(), timeframe, reason);
                    }
                }
                self.positions.check_trades(prediction.price);
            }
            // Skip this cycle, the next tick tries again
            Err(e) => log::warn!("  | {} {:<4} -> Error: {}", self.pair_interval.name(), timeframe, e),
        }

        // No subscribers is fine
        let _ = self.reports.send(AnalysisReport {
            pair_interval: self.pair_interval.clone(),
            duration_ms: start.elapsed().as_millis(),
            outcome,
        });
    }
}

/// Monitors one symbol: one analysis task per configured timeframe, sharing one position tracker.
///
/// `new` creates the worker, `run` consumes it and returns only after every task
/// has observed cancellation, so a stopped worker can never be restarted.
pub struct Worker {
    symbol: String,
    source: Arc<dyn MarketDataSource>,
    config: Arc<WorkerConfig>,
    positions: Arc<PositionTracker>,
    reports: broadcast::Sender<AnalysisReport>,
}

impl Worker {
    pub fn new(
        symbol: &str,
        source: Arc<dyn MarketDataSource>,
        config: Arc<WorkerConfig>,
        reports: broadcast::Sender<AnalysisReport>,
    ) -> Self {
        Self {
            symbol: symbol.to_string(),
            source,
            config,
            positions: Arc::new(PositionTracker::new()),
            reports,
        }
    }

    /// The tracker the analysis tasks report prices to.
    pub fn positions(&self) -> Arc<PositionTracker> {
        Arc::clone(&self.positions)
    }

    pub async fn run(self, cancel: watch::Receiver<bool>) {
        log::info!(
            "Starting automated analysis worker for {} on {} timeframes",
            self.symbol,
            self.config.timeframes.len()
        );

        let handles: Vec<JoinHandle<()>> = self
            .config
            .timeframes
            .iter()
            .map(|schedule| tokio::spawn(self.analysis_task(schedule).run(cancel.clone())))
            .collect();

        // Join: the worker is stopped only when every task has unwound
        for result in join_all(handles).await {
            if let Err(e) = result {
                log::error!("Analysis task for {} ended abnormally: {}", self.symbol, e);
            }
        }

        if DEBUG_FLAGS.print_worker_lifecycle {
            log::info!(
                "Worker for {} stopped ({} open trades left)",
                self.symbol,
                self.positions.open_count()
            );
        }
    }

    fn analysis_task(&self, schedule: &TimeframeSchedule) -> AnalysisTask {
        AnalysisTask {
            pair_interval: PairInterval::new(self.symbol.as_str(), schedule.interval_ms),
            poll_period: schedule.poll_period(),
            params: self.config.prediction,
            source: Arc::clone(&self.source),
            positions: Arc::clone(&self.positions),
            reports: self.reports.clone(),
        }
    }
}

//! Analysis and worker scheduling configuration

use crate::domain::PredictionParameters;
use crate::utils::TimeUtils;

/// One timeframe a worker analyses, and how often it polls for it.
/// The poll period is a tunable of its own: a `1d` timeframe is still polled hourly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeframeSchedule {
    // Candle width requested from the market data source
    pub interval_ms: i64,
    // Seconds between two analysis cycles
    pub poll_secs: u64,
}

impl TimeframeSchedule {
    pub const fn new(interval_ms: i64, poll_secs: u64) -> Self {
        Self {
            interval_ms,
            poll_secs,
        }
    }

    /// Never shorter than one second, a zero period would make the ticker panic.
    pub fn poll_period(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.poll_secs.max(1))
    }
}

/// Settings for worker channels
pub struct ReportSettings {
    // Capacity of the analysis report broadcast channel. Slow subscribers lag, workers never block.
    pub broadcast_capacity: usize,
}

/// The Master Analysis Configuration
pub struct AnalysisConfig {
    pub timeframes: &'static [TimeframeSchedule],
    pub prediction: PredictionParameters,
    pub reports: ReportSettings,
}

pub const ANALYSIS: AnalysisConfig = AnalysisConfig {
    timeframes: &[
        TimeframeSchedule::new(TimeUtils::MS_IN_MIN, 10),
        TimeframeSchedule::new(TimeUtils::MS_IN_5_MIN, 10),
        TimeframeSchedule::new(TimeUtils::MS_IN_D, 60 * 60),
    ],
    prediction: PredictionParameters::DEFAULT,
    reports: ReportSettings {
        broadcast_capacity: 256,
    },
};

/// Runtime configuration handed to the worker manager at construction.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkerConfig {
    pub timeframes: Vec<TimeframeSchedule>,
    pub prediction: PredictionParameters,
    pub broadcast_capacity: usize,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            timeframes: ANALYSIS.timeframes.to_vec(),
            prediction: ANALYSIS.prediction,
            broadcast_capacity: ANALYSIS.reports.broadcast_capacity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_daily_timeframe_polls_hourly() {
        let daily = ANALYSIS
            .timeframes
            .iter()
            .find(|s| s.interval_ms == TimeUtils::MS_IN_D)
            .unwrap();
        assert_eq!(daily.poll_period(), std::time::Duration::from_secs(3600));
    }

    #[test]
    fn test_zero_poll_secs_is_clamped() {
        let schedule = TimeframeSchedule::new(TimeUtils::MS_IN_MIN, 0);
        assert_eq!(schedule.poll_period(), std::time::Duration::from_secs(1));
    }
}

use serde::{Deserialize, Serialize};

/// Directional call produced by the prediction engine.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum_macros::Display,
    strum_macros::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Signal {
    Buy,
    Sell,
    Hold,
}

/// Indicator periods fed to the prediction engine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictionParameters {
    pub rsi_period: usize,
    pub macd_fast_period: usize,
    pub macd_slow_period: usize,
    pub macd_signal_period: usize,
    pub bbands_period: usize,
    pub bbands_std_dev_factor: f64,
}

impl PredictionParameters {
    pub const DEFAULT: PredictionParameters = PredictionParameters {
        rsi_period: 14,
        macd_fast_period: 12,
        macd_slow_period: 26,
        macd_signal_period: 9,
        bbands_period: 20,
        bbands_std_dev_factor: 2.0,
    };

    /// Shortest history that gives every indicator a usable tail.
    pub fn required_history(&self) -> usize {
        self.rsi_period
            .max(self.macd_slow_period)
            .max(self.bbands_period)
            + self.macd_signal_period
    }
}

impl Default for PredictionParameters {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub pair: String,
    pub signal: Signal,
    /// 0.0 ..= 1.0
    pub confidence: f64,
    pub price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl Prediction {
    pub fn hold(pair: &str, price: f64, reason: &str) -> Self {
        Self {
            pair: pair.to_string(),
            signal: Signal::Hold,
            confidence: 0.0,
            price,
            reason: Some(reason.to_string()),
        }
    }
}

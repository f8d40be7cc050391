use serde::{Deserialize, Serialize};

use crate::utils::TimeUtils;

/// One (symbol, timeframe) analysis stream, e.g. `BTCUSDT` polled on `1m` candles.
#[derive(Serialize, Deserialize, Debug, Clone, Hash, Eq, PartialEq)]
pub struct PairInterval {
    pub name: String,
    pub interval_ms: i64,
}

impl PairInterval {
    pub fn new(name: impl Into<String>, interval_ms: i64) -> Self {
        Self {
            name: name.into(),
            interval_ms,
        }
    }

    // The name we pass into the Binance API (not necessarily display name)
    pub fn bn_name(&self) -> &str {
        &self.name
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Binance shorthand for the timeframe (`1m`, `5m`, `1d`...)
    pub fn timeframe(&self) -> &'static str {
        TimeUtils::interval_to_string(self.interval_ms)
    }
}

impl std::fmt::Display for PairInterval {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{} [{}]", self.name(), self.timeframe())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_uses_timeframe_shorthand() {
        let pair = PairInterval::new("BTCUSDT", TimeUtils::MS_IN_5_MIN);
        assert_eq!(pair.to_string(), "BTCUSDT [5m]");
    }
}

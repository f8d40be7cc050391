//! Ladder strategies: price levels to enter at, each with its own exits, and a rough profit outlook.

use std::fmt;

use chrono::TimeDelta;
use serde::{Deserialize, Serialize};

use crate::config::STRATEGIES;
use crate::domain::{Signal, Trade};
use crate::utils::TimeUtils;

/// How far out a strategy is expected to run.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    strum_macros::Display,
    strum_macros::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Horizon {
    Short,
    Long,
}

/// One rung of a ladder: enter at `price`, exit at `take_profit` or `stop_loss`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategySignal {
    pub signal: Signal,
    pub price: f64,
    pub take_profit: f64,
    pub stop_loss: f64,
    pub horizon: Horizon,
}

impl StrategySignal {
    /// The simulated long position this rung opens, for a position tracker to watch.
    /// Sell rungs are short entries and have no such position.
    pub fn entry_trade(
        &self,
        symbol: &str,
        max_duration: TimeDelta,
        account_balance: f64,
        risk_percent: f64,
    ) -> Option<Trade> {
        (self.signal == Signal::Buy).then(|| {
            Trade::open(
                symbol,
                self.price,
                self.take_profit,
                self.stop_loss,
                max_duration,
                account_balance,
                risk_percent,
            )
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProfitPrediction {
    /// In quote currency
    pub profit: f64,
    pub percentage: f64,
}

impl ProfitPrediction {
    fn from_return(investment: f64, rate: f64) -> Self {
        Self {
            profit: investment * rate,
            percentage: rate * 100.0,
        }
    }
}

pub trait Strategy: fmt::Display + Send + Sync {
    /// Entry levels around `current_price`, nearest first.
    fn signals(&self, current_price: f64) -> Vec<StrategySignal>;

    fn profit_prediction(&self, investment: f64, horizon: Horizon) -> ProfitPrediction;
}

/// Symmetric ladder of buys below and sells above the current price.
#[derive(Debug, Clone, PartialEq)]
pub struct GridStrategy {
    pub levels: u32,
    pub grid_size_percent: f64,
}

impl Default for GridStrategy {
    fn default() -> Self {
        Self {
            levels: STRATEGIES.grid.levels,
            grid_size_percent: STRATEGIES.grid.grid_size_percent,
        }
    }
}

impl Strategy for GridStrategy {
    fn signals(&self, current_price: f64) -> Vec<StrategySignal> {
        let step = self.grid_size_percent / 100.0;

        (1..=self.levels)
            .flat_map(|level| {
                let offset = f64::from(level) * step;
                let buy_price = current_price * (1.0 - offset);
                let sell_price = current_price * (1.0 + offset);

                // Exits sit 2 rungs in profit and 1.5 rungs in loss
                [
                    StrategySignal {
                        signal: Signal::Buy,
                        price: buy_price,
                        take_profit: buy_price * (1.0 + step * 2.0),
                        stop_loss: buy_price * (1.0 - step * 1.5),
                        horizon: Horizon::Long,
                    },
                    StrategySignal {
                        signal: Signal::Sell,
                        price: sell_price,
                        take_profit: sell_price * (1.0 - step * 2.0),
                        stop_loss: sell_price * (1.0 + step * 1.5),
                        horizon: Horizon::Long,
                    },
                ]
            })
            .collect()
    }

    fn profit_prediction(&self, investment: f64, horizon: Horizon) -> ProfitPrediction {
        let assumptions = &STRATEGIES.profit;
        let mut rate = f64::from(self.levels) * assumptions.grid_return_per_level;
        if horizon == Horizon::Short {
            rate *= assumptions.grid_short_factor;
        }
        ProfitPrediction::from_return(investment, rate)
    }
}

impl fmt::Display for GridStrategy {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "grid ({} levels, {:.2}% apart)",
            self.levels, self.grid_size_percent
        )
    }
}

/// Dollar-cost averaging: fixed buys on a schedule, shown as two buy levels under the market.
#[derive(Debug, Clone, PartialEq)]
pub struct Dca {
    pub amount: f64,
    pub interval_ms: i64,
}

impl Default for Dca {
    fn default() -> Self {
        Self {
            amount: STRATEGIES.dca.amount,
            interval_ms: STRATEGIES.dca.interval_ms,
        }
    }
}

// (entry, take profit, stop loss) as fractions of the current price
const DCA_LEVELS: [(f64, f64, f64); 2] = [(0.98, 1.05, 0.92), (0.95, 1.08, 0.89)];

impl Strategy for Dca {
    fn signals(&self, current_price: f64) -> Vec<StrategySignal> {
        DCA_LEVELS
            .iter()
            .map(|&(entry, take_profit, stop_loss)| StrategySignal {
                signal: Signal::Buy,
                price: current_price * entry,
                take_profit: current_price * take_profit,
                stop_loss: current_price * stop_loss,
                horizon: Horizon::Long,
            })
            .collect()
    }

    fn profit_prediction(&self, investment: f64, horizon: Horizon) -> ProfitPrediction {
        let assumptions = &STRATEGIES.profit;
        let mut rate = assumptions.dca_average_return;
        if horizon == Horizon::Short {
            rate *= assumptions.dca_short_factor;
        }
        ProfitPrediction::from_return(investment, rate)
    }
}

impl fmt::Display for Dca {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "dca ({:.2} every {})",
            self.amount,
            TimeUtils::interval_to_string(self.interval_ms)
        )
    }
}

/// Strategies selectable by name (`grid`, `dca`).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display, strum_macros::EnumString,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum StrategyKind {
    Grid,
    Dca,
}

impl StrategyKind {
    /// The strategy with its configured defaults.
    pub fn build(self) -> Box<dyn Strategy> {
        match self {
            StrategyKind::Grid => Box::new(GridStrategy::default()),
            StrategyKind::Dca => Box::new(Dca::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{ExitReason, PositionTracker};

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {}, got {}",
            expected,
            actual
        );
    }

    #[test]
    fn test_grid_ladder_levels() {
        let signals = GridStrategy::default().signals(100.0);
        assert_eq!(signals.len(), 10);

        let first_buy = &signals[0];
        assert_eq!(first_buy.signal, Signal::Buy);
        assert_close(first_buy.price, 99.0);
        assert_close(first_buy.take_profit, 99.0 * 1.02);
        assert_close(first_buy.stop_loss, 99.0 * 0.985);

        let first_sell = &signals[1];
        assert_eq!(first_sell.signal, Signal::Sell);
        assert_close(first_sell.price, 101.0);
        assert_close(first_sell.take_profit, 101.0 * 0.98);
        assert_close(first_sell.stop_loss, 101.0 * 1.015);

        let deepest_buy = &signals[8];
        assert_close(deepest_buy.price, 95.0);
        assert!(signals.iter().all(|s| s.horizon == Horizon::Long));
    }

    #[test]
    fn test_grid_without_levels_is_empty() {
        let grid = GridStrategy {
            levels: 0,
            grid_size_percent: 1.0,
        };
        assert!(grid.signals(100.0).is_empty());
    }

    #[test]
    fn test_dca_buys_below_the_market() {
        let signals = Dca::default().signals(200.0);
        assert_eq!(signals.len(), 2);
        assert!(signals.iter().all(|s| s.signal == Signal::Buy));

        assert_close(signals[0].price, 196.0);
        assert_close(signals[0].take_profit, 210.0);
        assert_close(signals[0].stop_loss, 184.0);
        assert_close(signals[1].price, 190.0);
        assert_close(signals[1].take_profit, 216.0);
        assert_close(signals[1].stop_loss, 178.0);
    }

    #[test]
    fn test_profit_predictions() {
        let grid = GridStrategy::default().profit_prediction(1_000.0, Horizon::Long);
        assert_close(grid.profit, 100.0);
        assert_close(grid.percentage, 10.0);

        let grid_short = GridStrategy::default().profit_prediction(1_000.0, Horizon::Short);
        assert_close(grid_short.profit, 50.0);
        assert_close(grid_short.percentage, 5.0);

        let dca = Dca::default().profit_prediction(1_000.0, Horizon::Long);
        assert_close(dca.profit, 50.0);
        assert_close(dca.percentage, 5.0);

        let dca_short = Dca::default().profit_prediction(1_000.0, Horizon::Short);
        assert_close(dca_short.profit, 15.0);
        assert_close(dca_short.percentage, 1.5);
    }

    #[test]
    fn test_zero_investment_keeps_a_finite_percentage() {
        let outlook = GridStrategy::default().profit_prediction(0.0, Horizon::Long);
        assert_eq!(outlook.profit, 0.0);
        assert_close(outlook.percentage, 10.0);
    }

    #[test]
    fn test_buy_rung_feeds_the_position_tracker() {
        let rung = &GridStrategy::default().signals(100.0)[0];
        let trade = rung
            .entry_trade("BTCUSDT", TimeDelta::hours(4), 1_000.0, 1.0)
            .unwrap();
        assert_eq!(trade.entry_price, rung.price);

        let tracker = PositionTracker::new();
        tracker.add_trade(trade);
        assert!(tracker.check_trades(rung.price).is_empty());

        let exits = tracker.check_trades(rung.take_profit);
        assert_eq!(exits.len(), 1);
        assert_eq!(exits[0].reason, ExitReason::TakeProfit);
    }

    #[test]
    fn test_sell_rung_opens_no_long_position() {
        let rung = &GridStrategy::default().signals(100.0)[1];
        assert_eq!(
            rung.entry_trade("BTCUSDT", TimeDelta::hours(4), 1_000.0, 1.0),
            None
        );
    }

    #[test]
    fn test_strategy_kind_by_name() {
        assert_eq!("GRID".parse::<StrategyKind>().unwrap(), StrategyKind::Grid);
        assert_eq!("dca".parse::<StrategyKind>().unwrap(), StrategyKind::Dca);
        assert!("martingale".parse::<StrategyKind>().is_err());

        assert_eq!(StrategyKind::Grid.build().to_string(), "grid (5 levels, 1.00% apart)");
        assert_eq!(StrategyKind::Dca.build().to_string(), "dca (100.00 every 1d)");
    }
}

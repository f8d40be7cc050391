use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};

use crate::config::DEBUG_FLAGS;
use crate::domain::Trade;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReason {
    TakeProfit,
    StopLoss,
    Expired,
}

/// A trade closed by `check_trades`.
#[derive(Debug, Clone, PartialEq)]
pub struct TradeExit {
    pub symbol: String,
    pub reason: ExitReason,
    pub price: f64,
}

/// The simulated trades of one worker.
/// Closed trades stay in the set for the lifetime of the worker.
#[derive(Debug, Default)]
pub struct PositionTracker {
    trades: Mutex<Vec<Trade>>,
}

impl PositionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_trade(&self, trade: Trade) {
        self.lock().push(trade);
    }

    /// Closes every open trade whose exit condition is met at `latest_price`.
    pub fn check_trades(&self, latest_price: f64) -> Vec<TradeExit> {
        self.check_trades_at(latest_price, Utc::now())
    }

    /// `check_trades` against an explicit clock.
    /// Take-profit wins over stop-loss, which wins over expiry. Bounds are inclusive.
    pub fn check_trades_at(&self, latest_price: f64, now: DateTime<Utc>) -> Vec<TradeExit> {
        let mut trades = self.lock();
        let mut exits = Vec::new();

        for trade in trades.iter_mut().filter(|t| t.is_open) {
            let reason = if latest_price >= trade.take_profit {
                ExitReason::TakeProfit
            } else if latest_price <= trade.stop_loss {
                ExitReason::StopLoss
            } else if now - trade.open_time >= trade.max_duration {
                ExitReason::Expired
            } else {
                continue;
            };

            trade.is_open = false;
            match reason {
                ExitReason::TakeProfit => {
                    log::info!("Trade for {} closed at TP: {:.4}", trade.symbol, latest_price)
                }
                ExitReason::StopLoss => {
                    log::info!("Trade for {} closed at SL: {:.4}", trade.symbol, latest_price)
                }
                ExitReason::Expired => log::info!(
                    "Trade for {} closed by duration at: {:.4}",
                    trade.symbol,
                    latest_price
                ),
            }
            exits.push(TradeExit {
                symbol: trade.symbol.clone(),
                reason,
                price: latest_price,
            });
        }

        if DEBUG_FLAGS.print_trade_checks {
            log::debug!(
                "Checked {} trades at {:.4}: {} closed",
                trades.len(),
                latest_price,
                exits.len()
            );
        }
        exits
    }

    /// Snapshot of every trade, open or closed.
    pub fn trades(&self) -> Vec<Trade> {
        self.lock().clone()
    }

    pub fn open_count(&self) -> usize {
        self.lock().iter().filter(|t| t.is_open).count()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Trade>> {
        self.trades.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;

    fn bracket_trade(open_time: DateTime<Utc>) -> Trade {
        Trade {
            symbol: "BTCUSDT".to_string(),
            entry_price: 100.0,
            take_profit: 110.0,
            stop_loss: 90.0,
            open_time,
            max_duration: TimeDelta::hours(1),
            is_open: true,
            size: 1.0,
            risk_percent: 1.0,
        }
    }

    fn tracker_with(trade: Trade) -> PositionTracker {
        let tracker = PositionTracker::new();
        tracker.add_trade(trade);
        tracker
    }

    #[test]
    fn test_take_profit_is_inclusive() {
        let now = Utc::now();
        let tracker = tracker_with(bracket_trade(now));

        assert!(tracker.check_trades_at(109.99, now).is_empty());
        assert_eq!(tracker.open_count(), 1);

        let exits = tracker.check_trades_at(110.0, now);
        assert_eq!(exits.len(), 1);
        assert_eq!(exits[0].reason, ExitReason::TakeProfit);
        assert_eq!(tracker.open_count(), 0);
    }

    #[test]
    fn test_stop_loss_is_inclusive() {
        let now = Utc::now();
        let tracker = tracker_with(bracket_trade(now));

        assert!(tracker.check_trades_at(90.01, now).is_empty());
        let exits = tracker.check_trades_at(90.0, now);
        assert_eq!(exits[0].reason, ExitReason::StopLoss);
    }

    #[test]
    fn test_expiry_closes_inside_the_bracket() {
        let opened = Utc::now();
        let tracker = tracker_with(bracket_trade(opened));

        let almost = opened + TimeDelta::minutes(59);
        assert!(tracker.check_trades_at(100.0, almost).is_empty());

        let exits = tracker.check_trades_at(100.0, opened + TimeDelta::hours(1));
        assert_eq!(exits[0].reason, ExitReason::Expired);
    }

    #[test]
    fn test_wall_clock_expiry() {
        let tracker = tracker_with(bracket_trade(Utc::now() - TimeDelta::hours(2)));
        let exits = tracker.check_trades(100.0);
        assert_eq!(exits.len(), 1);
        assert_eq!(exits[0].reason, ExitReason::Expired);
    }

    #[test]
    fn test_take_profit_checked_before_expiry() {
        let opened = Utc::now() - TimeDelta::hours(3);
        let tracker = tracker_with(bracket_trade(opened));
        let exits = tracker.check_trades(120.0);
        assert_eq!(exits[0].reason, ExitReason::TakeProfit);
    }

    #[test]
    fn test_closed_trades_are_kept_and_never_reopened() {
        let now = Utc::now();
        let tracker = tracker_with(bracket_trade(now));
        tracker.add_trade(Trade {
            take_profit: 200.0,
            ..bracket_trade(now)
        });

        assert_eq!(tracker.check_trades_at(110.0, now).len(), 1);
        // Second call: the first trade is already closed, the second still brackets 150
        assert!(tracker.check_trades_at(150.0, now).is_empty());
        assert_eq!(tracker.check_trades_at(80.0, now).len(), 1);

        let trades = tracker.trades();
        assert_eq!(trades.len(), 2);
        assert!(trades.iter().all(|t| !t.is_open));
    }
}

use chrono::{DateTime, TimeDelta, Utc};

/// A simulated position watched by a worker's position tracker.
#[derive(Debug, Clone, PartialEq)]
pub struct Trade {
    pub symbol: String,
    pub entry_price: f64,
    pub take_profit: f64,
    pub stop_loss: f64,
    pub open_time: DateTime<Utc>,
    pub max_duration: TimeDelta,
    pub is_open: bool,
    /// Amount of base asset
    pub size: f64,
    /// % of capital risked on this trade
    pub risk_percent: f64,
}

impl Trade {
    /// Opens a position now, sized so that hitting the stop loses `risk_percent` of `account_balance`.
    pub fn open(
        symbol: &str,
        entry_price: f64,
        take_profit: f64,
        stop_loss: f64,
        max_duration: TimeDelta,
        account_balance: f64,
        risk_percent: f64,
    ) -> Self {
        Self {
            symbol: symbol.to_string(),
            entry_price,
            take_profit,
            stop_loss,
            open_time: Utc::now(),
            max_duration,
            is_open: true,
            size: position_size(account_balance, risk_percent, entry_price, stop_loss),
            risk_percent,
        }
    }
}

/// Position size for a fixed-fraction risk model. Zero when entry and stop coincide.
pub fn position_size(account_balance: f64, risk_percent: f64, entry_price: f64, stop_loss: f64) -> f64 {
    let risk_amount = account_balance * (risk_percent / 100.0);
    let stop_loss_distance = (entry_price - stop_loss).abs();
    if stop_loss_distance == 0.0 {
        return 0.0;
    }
    risk_amount / stop_loss_distance
}

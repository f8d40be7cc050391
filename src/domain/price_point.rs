use serde::{Deserialize, Serialize};

/// Closing price of one candle, stamped with the candle close time (epoch ms).
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct PricePoint {
    pub timestamp_ms: i64,
    pub price: f64,
}

impl PricePoint {
    pub fn new(timestamp_ms: i64, price: f64) -> Self {
        Self {
            timestamp_ms,
            price,
        }
    }
}

/// Re-orders a newest-first window into chronological (oldest-first) closing prices.
pub fn chronological_prices(newest_first: &[PricePoint]) -> Vec<f64> {
    newest_first.iter().rev().map(|p| p.price).collect()
}

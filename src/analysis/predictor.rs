use crate::analysis::indicators::{
    Crossover, calculate_bollinger_bands, calculate_macd, calculate_rsi,
};
use crate::domain::price_point::chronological_prices;
use crate::domain::{Prediction, PredictionParameters, PricePoint, Signal};

pub const RSI_OVERSOLD: f64 = 30.0;
pub const RSI_OVERBOUGHT: f64 = 70.0;

/// Largest possible gap between the buy and sell scores (RSI 1 + MACD 1 + bands 2).
const MAX_SCORE_DIFFERENTIAL: f64 = 4.0;

pub const INSUFFICIENT_HISTORY: &str = "insufficient history";
const NO_TRIGGER: &str = "no indicator triggered";

#[derive(Debug, Default)]
struct Scores {
    buy: u32,
    sell: u32,
    reasons: Vec<String>,
}

impl Scores {
    fn vote(&mut self, signal: Signal, weight: u32, reason: String) {
        match signal {
            Signal::Buy => self.buy += weight,
            Signal::Sell => self.sell += weight,
            Signal::Hold => {}
        }
        self.reasons.push(reason);
    }
}

/// Scores RSI, MACD and Bollinger Bands over a newest-first price history.
///
/// Histories shorter than [`PredictionParameters::required_history`] never reach the
/// indicators and come back as a zero-confidence hold.
pub fn predict(pair: &str, history: &[PricePoint], params: &PredictionParameters) -> Prediction {
    let newest_price = history.first().map(|p| p.price).unwrap_or(0.0);
    if history.is_empty() || history.len() < params.required_history() {
        return Prediction::hold(pair, newest_price, INSUFFICIENT_HISTORY);
    }

    let prices = chronological_prices(history);
    let latest_price = newest_price;
    let mut scores = Scores::default();

    // 1. RSI
    let rsi = calculate_rsi(&prices, params.rsi_period);
    if rsi < RSI_OVERSOLD {
        scores.vote(Signal::Buy, 1, format!("RSI oversold ({:.1})", rsi));
    } else if rsi > RSI_OVERBOUGHT {
        scores.vote(Signal::Sell, 1, format!("RSI overbought ({:.1})", rsi));
    }

    // 2. MACD
    let macd = calculate_macd(
        &prices,
        params.macd_fast_period,
        params.macd_slow_period,
        params.macd_signal_period,
    );
    match macd.crossover() {
        Some(Crossover::Bullish) => {
            scores.vote(Signal::Buy, 1, "MACD bullish crossover".to_string())
        }
        Some(Crossover::Bearish) => {
            scores.vote(Signal::Sell, 1, "MACD bearish crossover".to_string())
        }
        None => {}
    }

    // 3. Bollinger Bands (weighted double)
    let bands = calculate_bollinger_bands(
        &prices,
        params.bbands_period,
        params.bbands_std_dev_factor,
    );
    if let (Some(&lower), Some(&upper)) = (bands.lower.last(), bands.upper.last()) {
        if latest_price < lower {
            scores.vote(
                Signal::Buy,
                2,
                format!("price below lower band ({:.4})", lower),
            );
        } else if latest_price > upper {
            scores.vote(
                Signal::Sell,
                2,
                format!("price above upper band ({:.4})", upper),
            );
        }
    }

    let (signal, confidence) = if scores.buy > scores.sell {
        (
            Signal::Buy,
            f64::from(scores.buy - scores.sell) / MAX_SCORE_DIFFERENTIAL,
        )
    } else if scores.sell > scores.buy {
        (
            Signal::Sell,
            f64::from(scores.sell - scores.buy) / MAX_SCORE_DIFFERENTIAL,
        )
    } else {
        (Signal::Hold, 0.0)
    };

    let reason = if scores.reasons.is_empty() {
        NO_TRIGGER.to_string()
    } else {
        scores.reasons.join("; ")
    };

    Prediction {
        pair: pair.to_string(),
        signal,
        confidence,
        price: latest_price,
        reason: Some(reason),
    }
}

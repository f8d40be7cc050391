//! Technical indicators for signal generation.
//!
//! Every function takes prices in chronological order (oldest first) and returns
//! series in chronological order. A series shorter than the requested period
//! yields an empty output rather than an error.

use itertools::Itertools;
use statrs::statistics::Statistics;

/// RSI reported when there is nothing to measure.
pub const RSI_NEUTRAL: f64 = 50.0;

/// Simple moving average, one value per full window (`len - period + 1` values).
pub fn simple_moving_average(prices: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || prices.len() < period {
        return Vec::new();
    }

    let divisor = period as f64;
    let mut sum: f64 = prices[..period].iter().sum();
    let mut smas = Vec::with_capacity(prices.len() - period + 1);
    smas.push(sum / divisor);

    // Running sum: drop the value leaving the window, add the one entering it
    for i in period..prices.len() {
        sum = sum - prices[i - period] + prices[i];
        smas.push(sum / divisor);
    }
    smas
}

/// Exponential moving average seeded with the SMA of the first `period` prices.
pub fn exponential_moving_average(prices: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || prices.len() < period {
        return Vec::new();
    }

    let multiplier = 2.0 / (period as f64 + 1.0);
    let seed = prices[..period].iter().sum::<f64>() / period as f64;

    std::iter::once(seed)
        .chain(prices[period..].iter().scan(seed, |previous, &price| {
            *previous += (price - *previous) * multiplier;
            Some(*previous)
        }))
        .collect()
}

/// Population standard deviation of each sliding window.
pub fn standard_deviation(prices: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || prices.len() < period {
        return Vec::new();
    }
    prices
        .windows(period)
        .map(|window| window.iter().population_std_dev())
        .collect()
}

/// Relative Strength Index of the most recent `period` price changes.
///
/// Falls back to [`RSI_NEUTRAL`] when there are not more than `period` prices, and
/// when the window saw no movement at all. Gains without any loss saturate at 100.
pub fn calculate_rsi(prices: &[f64], period: usize) -> f64 {
    if period == 0 || prices.len() <= period {
        return RSI_NEUTRAL;
    }

    let (gains, losses): (Vec<f64>, Vec<f64>) = prices
        .iter()
        .tuple_windows()
        .map(|(previous, current)| {
            let change = current - previous;
            if change > 0.0 {
                (change, 0.0)
            } else {
                (0.0, -change)
            }
        })
        .unzip();

    let avg_gain = simple_moving_average(&gains, period).last().copied();
    let avg_loss = simple_moving_average(&losses, period).last().copied();

    match (avg_gain, avg_loss) {
        (Some(gain), Some(loss)) if loss > 0.0 => {
            let rs = gain / loss;
            100.0 - (100.0 / (1.0 + rs))
        }
        // Gains with no losses at all: a steady rally saturates at 100 instead of reading neutral
        (Some(gain), Some(_)) if gain > 0.0 => 100.0,
        _ => RSI_NEUTRAL,
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Macd {
    pub macd_line: Vec<f64>,
    pub signal_line: Vec<f64>,
}

impl Macd {
    /// Direction of a crossover between the last two points, if any.
    pub fn crossover(&self) -> Option<Crossover> {
        let (macd_prev, macd_last) = last_two(&self.macd_line)?;
        let (signal_prev, signal_last) = last_two(&self.signal_line)?;

        if macd_last > signal_last && macd_prev <= signal_prev {
            Some(Crossover::Bullish)
        } else if macd_last < signal_last && macd_prev >= signal_prev {
            Some(Crossover::Bearish)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Crossover {
    Bullish,
    Bearish,
}

/// MACD line (fast EMA minus slow EMA on their common tail) and its signal EMA.
pub fn calculate_macd(
    prices: &[f64],
    fast_period: usize,
    slow_period: usize,
    signal_period: usize,
) -> Macd {
    let ema_fast = exponential_moving_average(prices, fast_period);
    let ema_slow = exponential_moving_average(prices, slow_period);
    let (ema_fast, ema_slow) = trailing_aligned(&ema_fast, &ema_slow);

    let macd_line: Vec<f64> = ema_fast
        .iter()
        .zip(ema_slow)
        .map(|(fast, slow)| fast - slow)
        .collect();
    let signal_line = exponential_moving_average(&macd_line, signal_period);

    Macd {
        macd_line,
        signal_line,
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct BollingerBands {
    pub middle: Vec<f64>,
    pub upper: Vec<f64>,
    pub lower: Vec<f64>,
}

/// SMA envelope at `std_dev_factor` population standard deviations.
pub fn calculate_bollinger_bands(
    prices: &[f64],
    period: usize,
    std_dev_factor: f64,
) -> BollingerBands {
    let sma = simple_moving_average(prices, period);
    let std_dev = standard_deviation(prices, period);
    let (sma, std_dev) = trailing_aligned(&sma, &std_dev);

    let (upper, lower) = sma
        .iter()
        .zip(std_dev)
        .map(|(mid, sd)| (mid + sd * std_dev_factor, mid - sd * std_dev_factor))
        .unzip();

    BollingerBands {
        middle: sma.to_vec(),
        upper,
        lower,
    }
}

/// Cuts the longer series from the front so both end on the same (latest) point.
fn trailing_aligned<'a>(a: &'a [f64], b: &'a [f64]) -> (&'a [f64], &'a [f64]) {
    let common = a.len().min(b.len());
    (&a[a.len() - common..], &b[b.len() - common..])
}

fn last_two(series: &[f64]) -> Option<(f64, f64)> {
    match series {
        [.., previous, last] => Some((*previous, *last)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn test_simple_moving_average() {
        let sma = simple_moving_average(&[10.0, 20.0, 30.0, 40.0], 3);
        assert_eq!(sma.len(), 2);
        assert_close(sma[0], 20.0); // (10+20+30)/3
        assert_close(sma[1], 30.0); // (20+30+40)/3

        assert!(simple_moving_average(&[1.0, 2.0], 3).is_empty());
        assert!(simple_moving_average(&[1.0, 2.0], 0).is_empty());
    }

    #[test]
    fn test_exponential_moving_average() {
        // Seed = (1+2+3)/3 = 2, multiplier = 2/(3+1) = 0.5
        let ema = exponential_moving_average(&[1.0, 2.0, 3.0, 4.0, 5.0], 3);
        assert_eq!(ema.len(), 3);
        assert_close(ema[0], 2.0);
        assert_close(ema[1], 3.0); // (4-2)*0.5 + 2
        assert_close(ema[2], 4.0); // (5-3)*0.5 + 3

        assert!(exponential_moving_average(&[1.0], 2).is_empty());
    }

    #[test]
    fn test_standard_deviation_is_population() {
        let prices = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        let sd = standard_deviation(&prices, 8);
        assert_eq!(sd.len(), 1);
        assert_close(sd[0], 2.0);

        let flat = standard_deviation(&[3.0; 5], 2);
        assert_eq!(flat, vec![0.0; 4]);
    }

    #[test]
    fn test_rsi_strictly_increasing_saturates_high() {
        let prices: Vec<f64> = (1..=30).map(f64::from).collect();
        assert!(calculate_rsi(&prices, 14) > 99.0);
    }

    #[test]
    fn test_rsi_strictly_decreasing_saturates_low() {
        let prices: Vec<f64> = (1..=30).rev().map(f64::from).collect();
        assert!(calculate_rsi(&prices, 14) < 1.0);
    }

    #[test]
    fn test_rsi_constant_prices_is_neutral() {
        assert_eq!(calculate_rsi(&[42.0; 30], 14), RSI_NEUTRAL);
    }

    #[test]
    fn test_rsi_short_history_is_neutral() {
        let prices: Vec<f64> = (1..=14).map(f64::from).collect();
        assert_eq!(calculate_rsi(&prices, 14), RSI_NEUTRAL);
    }

    #[test]
    fn test_rsi_mixed_moves() {
        // One +2 and one -1 over a period of 2: RS = 2, RSI = 100 - 100/3
        let rsi = calculate_rsi(&[10.0, 12.0, 11.0], 2);
        assert_close(rsi, 100.0 - 100.0 / 3.0);
    }

    #[test]
    fn test_macd_lines_share_the_latest_point() {
        let prices: Vec<f64> = (0..60).map(|i| 100.0 + (i as f64 * 0.3).sin() * 5.0).collect();
        let macd = calculate_macd(&prices, 12, 26, 9);

        assert_eq!(macd.macd_line.len(), 60 - 26 + 1);
        assert_eq!(macd.signal_line.len(), macd.macd_line.len() - 9 + 1);

        let fast = exponential_moving_average(&prices, 12);
        let slow = exponential_moving_average(&prices, 26);
        let last = macd.macd_line.last().copied().unwrap();
        assert_close(last, fast.last().unwrap() - slow.last().unwrap());
    }

    #[test]
    fn test_macd_with_swapped_periods_still_aligns() {
        let prices: Vec<f64> = (0..40).map(f64::from).collect();
        let macd = calculate_macd(&prices, 26, 12, 9);
        assert_eq!(macd.macd_line.len(), 40 - 26 + 1);
    }

    #[test]
    fn test_macd_crossovers() {
        let bullish = Macd {
            macd_line: vec![-1.0, 0.0, 1.0],
            signal_line: vec![0.0, 0.0],
        };
        assert_eq!(bullish.crossover(), Some(Crossover::Bullish));

        let bearish = Macd {
            macd_line: vec![0.0, -1.0],
            signal_line: vec![0.0, 0.0],
        };
        assert_eq!(bearish.crossover(), Some(Crossover::Bearish));

        let steady = Macd {
            macd_line: vec![2.0, 2.0],
            signal_line: vec![1.0, 1.0],
        };
        assert_eq!(steady.crossover(), None);
        assert_eq!(Macd::default().crossover(), None);
    }

    #[test]
    fn test_bollinger_bands() {
        let prices = [1.0, 2.0, 3.0, 4.0, 5.0];
        let bands = calculate_bollinger_bands(&prices, 5, 2.0);
        let sd = 2.0_f64.sqrt();

        assert_eq!(bands.middle.len(), 1);
        assert_close(bands.middle[0], 3.0);
        assert_close(bands.upper[0], 3.0 + 2.0 * sd);
        assert_close(bands.lower[0], 3.0 - 2.0 * sd);
    }

    #[test]
    fn test_indicators_ignore_double_reversal() {
        let prices: Vec<f64> = (0..50).map(|i| 50.0 + (i as f64 * 0.7).cos() * 3.0).collect();
        let mut newest_first = prices.clone();
        newest_first.reverse();
        let mut round_trip = newest_first.clone();
        round_trip.reverse();
        assert_ne!(newest_first, prices);

        assert_eq!(calculate_rsi(&prices, 14), calculate_rsi(&round_trip, 14));
        assert_eq!(
            calculate_macd(&prices, 12, 26, 9),
            calculate_macd(&round_trip, 12, 26, 9)
        );
        assert_eq!(
            calculate_bollinger_bands(&prices, 20, 2.0),
            calculate_bollinger_bands(&round_trip, 20, 2.0)
        );
    }
}

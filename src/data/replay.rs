use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};

use anyhow::{Result, anyhow, bail};
use async_trait::async_trait;

use crate::data::MarketDataSource;
use crate::domain::{PairInterval, PricePoint};

/// One scripted answer of a [`ReplaySource`].
#[derive(Debug, Clone)]
pub enum ReplayStep {
    Window(Vec<PricePoint>),
    Failure(String),
}

#[derive(Debug, Default)]
struct Script {
    steps: VecDeque<ReplayStep>,
    fetches: usize,
}

/// In-memory market data: serves scripted windows per pair, in order.
/// The last step of a script keeps being served once the others are used up.
#[derive(Debug, Default)]
pub struct ReplaySource {
    scripts: Mutex<HashMap<PairInterval, Script>>,
}

impl ReplaySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a newest-first window for `pair_interval`.
    pub fn push_window(&self, pair_interval: PairInterval, window: Vec<PricePoint>) -> &Self {
        self.push(pair_interval, ReplayStep::Window(window))
    }

    /// Queue a fetch failure for `pair_interval`.
    pub fn push_failure(&self, pair_interval: PairInterval, message: &str) -> &Self {
        self.push(pair_interval, ReplayStep::Failure(message.to_string()))
    }

    /// How many times `pair_interval` has been fetched so far.
    pub fn fetch_count(&self, pair_interval: &PairInterval) -> usize {
        self.lock()
            .get(pair_interval)
            .map(|script| script.fetches)
            .unwrap_or(0)
    }

    fn push(&self, pair_interval: PairInterval, step: ReplayStep) -> &Self {
        self.lock()
            .entry(pair_interval)
            .or_default()
            .steps
            .push_back(step);
        self
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<PairInterval, Script>> {
        self.scripts.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl MarketDataSource for ReplaySource {
    async fn fetch(&self, pair_interval: &PairInterval) -> Result<Vec<PricePoint>> {
        let mut scripts = self.lock();
        let script = scripts
            .get_mut(pair_interval)
            .ok_or_else(|| anyhow!("no replay data for {}", pair_interval))?;
        script.fetches += 1;

        let step = if script.steps.len() > 1 {
            script.steps.pop_front()
        } else {
            script.steps.front().cloned()
        };

        match step {
            Some(ReplayStep::Window(window)) if !window.is_empty() => Ok(window),
            Some(ReplayStep::Window(_)) => bail!("empty replay window for {}", pair_interval),
            Some(ReplayStep::Failure(message)) => Err(anyhow!(message)),
            None => bail!("replay script for {} is empty", pair_interval),
        }
    }

    fn signature(&self) -> &'static str {
        "Replay"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::TimeUtils;

    #[tokio::test]
    async fn test_replays_in_order_then_repeats_last_step() {
        let pair = PairInterval::new("BTCUSDT", TimeUtils::MS_IN_MIN);
        let source = ReplaySource::new();
        source
            .push_failure(pair.clone(), "exchange down")
            .push_window(pair.clone(), vec![PricePoint::new(2, 101.0), PricePoint::new(1, 100.0)]);

        let first = source.fetch(&pair).await;
        assert!(first.unwrap_err().to_string().contains("exchange down"));

        for _ in 0..3 {
            let window = source.fetch(&pair).await.unwrap();
            assert_eq!(window[0].price, 101.0);
        }
        assert_eq!(source.fetch_count(&pair), 4);
    }

    #[tokio::test]
    async fn test_unknown_pair_fails() {
        let source = ReplaySource::new();
        let pair = PairInterval::new("DOGEUSDT", TimeUtils::MS_IN_D);

        assert!(source.fetch(&pair).await.is_err());
        assert_eq!(source.fetch_count(&pair), 0);
    }
}

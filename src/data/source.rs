use anyhow::Result;
use async_trait::async_trait;

use crate::domain::{PairInterval, PricePoint};

/// Where analysis tasks get their price windows from.
#[async_trait]
pub trait MarketDataSource: Send + Sync {
    /// Latest candle closes for the pair and timeframe, newest first.
    /// Must return at least one point on success.
    async fn fetch(&self, pair_interval: &PairInterval) -> Result<Vec<PricePoint>>;

    /// A unique identifier for this implementation (so that afterwards we know which one we used).
    fn signature(&self) -> &'static str;
}

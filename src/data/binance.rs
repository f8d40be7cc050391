// External crates
use anyhow::{Result, anyhow, bail};
use async_trait::async_trait;
use binance_sdk::config::ConfigurationRestApi;
use binance_sdk::spot::{
    SpotRestApi,
    rest_api::{KlinesIntervalEnum, KlinesItemInner, KlinesParams, RestApi},
};
use binance_sdk::{errors, errors::ConnectorError as connection_error};

// Local crates
use crate::config::binance::{BINANCE, BinanceApiConfig};
use crate::data::MarketDataSource;
use crate::domain::{PairInterval, PricePoint};
use crate::utils::TimeUtils;

// Positions inside a raw Binance kline array
const KLINE_CLOSE_PRICE: usize = 4;
const KLINE_CLOSE_TIME: usize = 6;

// For "MS -> Enum", a static helper is best, and we return Result instead of panicking.
pub fn try_interval_from_ms(ms: i64) -> Result<KlinesIntervalEnum, String> {
    match ms {
        TimeUtils::MS_IN_S => Ok(KlinesIntervalEnum::Interval1s),
        TimeUtils::MS_IN_MIN => Ok(KlinesIntervalEnum::Interval1m),
        TimeUtils::MS_IN_3_MIN => Ok(KlinesIntervalEnum::Interval3m),
        TimeUtils::MS_IN_5_MIN => Ok(KlinesIntervalEnum::Interval5m),
        TimeUtils::MS_IN_15_MIN => Ok(KlinesIntervalEnum::Interval15m),
        TimeUtils::MS_IN_30_MIN => Ok(KlinesIntervalEnum::Interval30m),
        TimeUtils::MS_IN_H => Ok(KlinesIntervalEnum::Interval1h),
        TimeUtils::MS_IN_2_H => Ok(KlinesIntervalEnum::Interval2h),
        TimeUtils::MS_IN_4_H => Ok(KlinesIntervalEnum::Interval4h),
        TimeUtils::MS_IN_6_H => Ok(KlinesIntervalEnum::Interval6h),
        TimeUtils::MS_IN_8_H => Ok(KlinesIntervalEnum::Interval8h),
        TimeUtils::MS_IN_12_H => Ok(KlinesIntervalEnum::Interval12h),
        TimeUtils::MS_IN_D => Ok(KlinesIntervalEnum::Interval1d),
        TimeUtils::MS_IN_3_D => Ok(KlinesIntervalEnum::Interval3d),
        TimeUtils::MS_IN_W => Ok(KlinesIntervalEnum::Interval1w),
        TimeUtils::MS_IN_1_M => Ok(KlinesIntervalEnum::Interval1M),
        _ => Err(format!("Unsupported interval: {}ms", ms)),
    }
}

/// Close price and close time of one raw kline. `None` if either is missing or unparsable.
fn kline_to_price_point(kline: &[KlinesItemInner]) -> Option<PricePoint> {
    match (kline.get(KLINE_CLOSE_PRICE), kline.get(KLINE_CLOSE_TIME)) {
        (Some(KlinesItemInner::String(close)), Some(KlinesItemInner::Integer(close_time))) => close
            .parse::<f64>()
            .ok()
            .map(|price| PricePoint::new(*close_time, price)),
        _ => None,
    }
}

/// Binance returns klines oldest first; analysis tasks expect newest first.
fn klines_to_newest_first(klines: &[Vec<KlinesItemInner>]) -> Vec<PricePoint> {
    // Skip a malformed kline rather than failing the whole window
    klines
        .iter()
        .rev()
        .filter_map(|kline| kline_to_price_point(kline))
        .collect()
}

fn log_connector_error(pair_interval: &PairInterval, e: &anyhow::Error) {
    let Some(conn_err) = e.downcast_ref::<errors::ConnectorError>() else {
        log::error!(
            "An unexpected error occurred for {}: {:#}",
            pair_interval,
            e
        );
        return;
    };
    match conn_err {
        connection_error::ConnectorClientError(msg) => {
            log::error!(
                "{} Client error: Check your request parameters. {}",
                pair_interval,
                msg
            );
        }
        connection_error::TooManyRequestsError(msg) => {
            log::error!(
                "{} Rate limit exceeded. Please wait and try again. {}",
                pair_interval,
                msg
            );
        }
        connection_error::RateLimitBanError(msg) => {
            log::error!(
                "{} IP address banned due to excessive rate limits. {}",
                pair_interval,
                msg
            );
        }
        errors::ConnectorError::ServerError { msg, status_code } => {
            log::error!(
                "{} Server error: {} (status code: {:?})",
                pair_interval,
                msg,
                status_code
            );
        }
        errors::ConnectorError::NetworkError(msg) => {
            log::error!(
                "{} Network error: Check your internet connection. {}",
                pair_interval,
                msg
            );
        }
        other => {
            log::error!("{} Binance connector error: {:?}", pair_interval, other);
        }
    }
}

/// Market data from the Binance spot REST klines endpoint.
pub struct BinanceKlineSource {
    rest_client: RestApi,
}

impl BinanceKlineSource {
    pub fn new() -> Result<Self> {
        let config = BinanceApiConfig::default();
        let rest_conf = ConfigurationRestApi::builder()
            .timeout(config.timeout_ms)
            .retries(config.retries)
            .backoff(config.backoff_ms)
            .build()?;
        // Public market data: no API key required
        let rest_client = SpotRestApi::production(rest_conf);
        Ok(Self { rest_client })
    }
}

#[async_trait]
impl MarketDataSource for BinanceKlineSource {
    async fn fetch(&self, pair_interval: &PairInterval) -> Result<Vec<PricePoint>> {
        let interval = try_interval_from_ms(pair_interval.interval_ms).map_err(|e| anyhow!(e))?;
        let params = KlinesParams::builder(pair_interval.bn_name().to_string(), interval)
            .limit(BINANCE.limits.klines_limit)
            .build()?;

        let response = match self.rest_client.klines(params).await {
            Ok(r) => r,
            Err(e) => {
                log_connector_error(pair_interval, &e);
                return Err(e.context(format!("Binance API call failed for {}", pair_interval)));
            }
        };
        let klines = response.data().await?;

        let window = klines_to_newest_first(&klines);
        if window.is_empty() {
            bail!(
                "no kline data returned from Binance for {} (is the symbol valid?)",
                pair_interval
            );
        }
        Ok(window)
    }

    fn signature(&self) -> &'static str {
        "Binance API"
    }
}

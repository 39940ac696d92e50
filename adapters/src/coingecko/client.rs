use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use corelib::{Asset, PriceTick};
use reqwest::{Client, StatusCode};
use serde_json::Value;
use tracing::{debug, instrument};

use super::SOURCE;
use crate::feed::{FeedError, PairSnapshot};
use crate::numeric::decimal_from_value;

#[derive(Clone)]
pub struct CoinGeckoClient {
    http: Client,
    url: String,
}

impl CoinGeckoClient {
    pub fn new(url: String) -> Result<Self, FeedError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            http,
            url: url.trim_end_matches('/').to_string(),
        })
    }

    /// Current BTC and ETH prices with 24h change.
    ///
    /// HTTP 429 maps to [`FeedError::RateLimited`] so the poller can back off.
    #[instrument(skip(self), level = "debug")]
    pub async fn fetch_prices(&self) -> Result<(PriceTick, PriceTick), FeedError> {
        let ids = Asset::ALL.map(|a| a.coingecko_id()).join(",");

        let resp = self
            .http
            .get(format!("{}/simple/price", self.url))
            .query(&[
                ("ids", ids.as_str()),
                ("vs_currencies", "usd"),
                ("include_24hr_change", "true"),
                ("include_24hr_vol", "true"),
            ])
            .send()
            .await?;

        if resp.status() == StatusCode::TOO_MANY_REQUESTS {
            return Err(FeedError::RateLimited(SOURCE));
        }

        let body: Value = resp.error_for_status()?.json().await?;
        let pair = parse_simple_price(&body, Utc::now())?;

        debug!(btc = %pair.0.price, eth = %pair.1.price, "coingecko prices fetched");

        Ok(pair)
    }

    pub async fn health_check(&self) -> bool {
        match self.http.get(format!("{}/ping", self.url)).send().await {
            Ok(resp) => resp.status().is_success(),
            Err(_) => false,
        }
    }
}

#[async_trait]
impl PairSnapshot for CoinGeckoClient {
    async fn fetch_pair(&self) -> Result<(PriceTick, PriceTick), FeedError> {
        self.fetch_prices().await
    }
}

/// Parse a `/simple/price` body into (BTC, ETH) ticks.
///
/// A coin without a `usd` price is an error; a missing `usd_24h_change`
/// counts as zero.
pub fn parse_simple_price(
    body: &Value,
    now: DateTime<Utc>,
) -> Result<(PriceTick, PriceTick), FeedError> {
    let tick = |asset: Asset| -> Result<PriceTick, FeedError> {
        let coin = &body[asset.coingecko_id()];

        let price = decimal_from_value(&coin["usd"]).ok_or(FeedError::MissingAsset(asset))?;
        let change = decimal_from_value(&coin["usd_24h_change"]).unwrap_or_default();

        Ok(PriceTick::new(asset, price, change, now, SOURCE))
    };

    Ok((tick(Asset::Btc)?, tick(Asset::Eth)?))
}

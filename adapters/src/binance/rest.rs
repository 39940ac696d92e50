use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use corelib::{Asset, PriceTick};
use reqwest::Client;
use tracing::{debug, instrument};

use super::parser::parse_rest_ticker;
use super::types::RestTicker;
use crate::feed::{FeedError, PairSnapshot};

/// Binance spot REST API. Used for the startup snapshot, which also decides
/// whether Binance is reachable at all.
#[derive(Clone)]
pub struct BinanceRestClient {
    http: Client,
    url: String,
}

impl BinanceRestClient {
    pub fn new(url: String) -> Result<Self, FeedError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(10))
            .pool_idle_timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            http,
            url: url.trim_end_matches('/').to_string(),
        })
    }

    #[instrument(skip(self), fields(asset = %asset), level = "debug")]
    pub async fn fetch_ticker(&self, asset: Asset) -> Result<PriceTick, FeedError> {
        let url = format!("{}/ticker/24hr", self.url);

        let resp = self
            .http
            .get(&url)
            .query(&[("symbol", asset.binance_symbol())])
            .send()
            .await?
            .error_for_status()?;

        let raw: RestTicker = resp.json().await?;
        let tick = parse_rest_ticker(raw, Utc::now())?;

        debug!(price = %tick.price, change = %tick.pct_change_24h, "binance ticker fetched");

        Ok(tick)
    }

    /// BTC and ETH tickers, fetched concurrently. Fails if either fails.
    pub async fn snapshot(&self) -> Result<(PriceTick, PriceTick), FeedError> {
        tokio::try_join!(self.fetch_ticker(Asset::Btc), self.fetch_ticker(Asset::Eth))
    }
}

#[async_trait]
impl PairSnapshot for BinanceRestClient {
    async fn fetch_pair(&self) -> Result<(PriceTick, PriceTick), FeedError> {
        self.snapshot().await
    }
}

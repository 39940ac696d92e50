use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use corelib::{Asset, EnrichmentSnapshot, VenueId};
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, instrument};

use super::{EnrichmentSource, VenueError};
use crate::numeric::{decimal_from_value, nonzero_decimal};

/// Extended exchange public markets API.
#[derive(Clone)]
pub struct ExtendedClient {
    http: Client,
    url: String,
}

#[derive(Debug, Deserialize)]
struct MarketsEnvelope {
    status: String,
    #[serde(default)]
    data: Vec<Market>,
}

#[derive(Debug, Deserialize)]
struct Market {
    name: String,
    #[serde(rename = "marketStats", default)]
    market_stats: Value,
}

impl ExtendedClient {
    pub fn new(url: String) -> Result<Self, VenueError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            http,
            url: url.trim_end_matches('/').to_string(),
        })
    }

    async fn fetch_market(&self, asset: Asset) -> Result<Value, VenueError> {
        let url = format!("{}/info/markets", self.url);
        let resp = self
            .http
            .get(&url)
            .query(&[("market", asset.usd_market())])
            .send()
            .await?
            .error_for_status()?;
        Ok(resp.json().await?)
    }
}

#[async_trait]
impl EnrichmentSource for ExtendedClient {
    fn venue(&self) -> VenueId {
        VenueId::Extended
    }

    #[instrument(skip(self), fields(venue = "extended", asset = %asset), level = "debug")]
    async fn snapshot(&self, asset: Asset) -> Result<EnrichmentSnapshot, VenueError> {
        let body = self.fetch_market(asset).await?;
        let snap = parse_markets(&body, asset, Utc::now())?;

        debug!(last = %snap.mark_price, "extended snapshot fetched");
        Ok(snap)
    }

    async fn health_check(&self) -> bool {
        match self.fetch_market(Asset::Btc).await {
            Ok(body) => body["status"].as_str() == Some("OK"),
            Err(_) => false,
        }
    }
}

/// Extract one market from an `/info/markets` body.
///
/// The envelope must report `"status": "OK"`. `fundingRate` is a fraction
/// and is converted to percent.
pub fn parse_markets(
    body: &Value,
    asset: Asset,
    now: DateTime<Utc>,
) -> Result<EnrichmentSnapshot, VenueError> {
    let envelope = MarketsEnvelope::deserialize(body)
        .map_err(|e| VenueError::InvalidResponse(e.to_string()))?;

    if envelope.status != "OK" {
        return Err(VenueError::InvalidResponse(format!(
            "status {}",
            envelope.status
        )));
    }

    let market = envelope
        .data
        .iter()
        .find(|m| m.name == asset.usd_market())
        .ok_or(VenueError::MissingAsset(asset))?;

    let stats = &market.market_stats;

    let last = nonzero_decimal(&stats["lastPrice"]).ok_or(VenueError::Parse {
        asset,
        field: "lastPrice",
    })?;

    Ok(EnrichmentSnapshot {
        venue: VenueId::Extended,
        asset,
        mark_price: last,
        bid: nonzero_decimal(&stats["bidPrice"]),
        ask: nonzero_decimal(&stats["askPrice"]),
        funding_rate_pct: decimal_from_value(&stats["fundingRate"])
            .map(|f| f * Decimal::ONE_HUNDRED),
        fetched_at: now,
    })
}

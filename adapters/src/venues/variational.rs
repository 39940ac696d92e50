use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use corelib::{Asset, EnrichmentSnapshot, VenueId};
use reqwest::Client;
use rust_decimal::Decimal;
use serde_json::Value;
use tracing::{debug, instrument};

use super::{EnrichmentSource, VenueError};
use crate::numeric::{decimal_from_value, nonzero_decimal};

/// Variational Omni public stats API.
#[derive(Clone)]
pub struct VariationalClient {
    http: Client,
    url: String,
}

impl VariationalClient {
    pub fn new(url: String) -> Result<Self, VenueError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            http,
            url: url.trim_end_matches('/').to_string(),
        })
    }

    async fn fetch_stats(&self) -> Result<Value, VenueError> {
        let url = format!("{}/metadata/stats", self.url);
        let resp = self.http.get(&url).send().await?.error_for_status()?;
        Ok(resp.json().await?)
    }
}

#[async_trait]
impl EnrichmentSource for VariationalClient {
    fn venue(&self) -> VenueId {
        VenueId::Variational
    }

    #[instrument(skip(self), fields(venue = "variational", asset = %asset), level = "debug")]
    async fn snapshot(&self, asset: Asset) -> Result<EnrichmentSnapshot, VenueError> {
        let stats = self.fetch_stats().await?;
        let snap = parse_stats(&stats, asset, Utc::now())?;

        debug!(mark = %snap.mark_price, "variational snapshot fetched");
        Ok(snap)
    }

    async fn health_check(&self) -> bool {
        self.fetch_stats().await.is_ok()
    }
}

/// Extract one asset from a `/metadata/stats` body.
///
/// `funding_rate` is a fraction and is converted to percent. The quote
/// timestamp falls back to `now` when absent or unparsable.
pub fn parse_stats(
    body: &Value,
    asset: Asset,
    now: DateTime<Utc>,
) -> Result<EnrichmentSnapshot, VenueError> {
    let listings = body["listings"]
        .as_array()
        .ok_or_else(|| VenueError::InvalidResponse("missing `listings`".into()))?;

    let listing = listings
        .iter()
        .find(|l| {
            l["ticker"]
                .as_str()
                .is_some_and(|t| t.eq_ignore_ascii_case(asset.symbol()))
        })
        .ok_or(VenueError::MissingAsset(asset))?;

    let mark_price = decimal_from_value(&listing["mark_price"]).ok_or(VenueError::Parse {
        asset,
        field: "mark_price",
    })?;

    let quotes = &listing["quotes"];
    let size_1k = &quotes["size_1k"];

    let fetched_at = quotes["updated_at"]
        .as_str()
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or(now);

    Ok(EnrichmentSnapshot {
        venue: VenueId::Variational,
        asset,
        mark_price,
        bid: nonzero_decimal(&size_1k["bid"]),
        ask: nonzero_decimal(&size_1k["ask"]),
        funding_rate_pct: decimal_from_value(&listing["funding_rate"])
            .map(|f| f * Decimal::ONE_HUNDRED),
        fetched_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;
    use serde_json::json;

    fn stats() -> Value {
        json!({
            "total_volume_24h": "123",
            "listings": [
                {
                    "ticker": "BTC",
                    "mark_price": "97180.12",
                    "funding_rate": "0.0001",
                    "volume_24h": "5000000",
                    "quotes": {
                        "updated_at": "2025-03-01T12:00:05Z",
                        "size_1k": { "bid": "97179.00", "ask": "97181.50" }
                    }
                },
                {
                    "ticker": "eth",
                    "mark_price": 3410.5,
                    "quotes": {}
                }
            ]
        })
    }

    #[test]
    fn test_full_listing() {
        let snap = parse_stats(&stats(), Asset::Btc, Utc::now()).unwrap();

        assert_eq!(snap.venue, VenueId::Variational);
        assert_eq!(snap.mark_price, dec!(97180.12));
        assert_eq!(snap.bid, Some(dec!(97179.00)));
        assert_eq!(snap.ask, Some(dec!(97181.50)));
        assert_eq!(snap.funding_rate_pct, Some(dec!(0.01)));
        assert_eq!(
            snap.fetched_at,
            Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 5).unwrap()
        );
    }

    #[test]
    fn test_sparse_listing_uses_defaults() {
        let now = Utc::now();
        let snap = parse_stats(&stats(), Asset::Eth, now).unwrap();

        assert_eq!(snap.mark_price, dec!(3410.5));
        assert_eq!(snap.bid, None);
        assert_eq!(snap.funding_rate_pct, None);
        assert_eq!(snap.fetched_at, now);
    }

    #[test]
    fn test_unlisted_asset() {
        let body = json!({ "listings": [] });
        assert!(matches!(
            parse_stats(&body, Asset::Btc, Utc::now()),
            Err(VenueError::MissingAsset(Asset::Btc))
        ));
    }

    #[test]
    fn test_bad_mark_price() {
        let body = json!({ "listings": [{ "ticker": "BTC", "mark_price": "?" }] });
        assert!(matches!(
            parse_stats(&body, Asset::Btc, Utc::now()),
            Err(VenueError::Parse { field: "mark_price", .. })
        ));
    }

    #[test]
    fn test_missing_listings_is_invalid() {
        assert!(matches!(
            parse_stats(&json!({}), Asset::Btc, Utc::now()),
            Err(VenueError::InvalidResponse(_))
        ));
    }
}

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::Asset;

/// Latest price observation for one asset from the signal source.
///
/// Superseded by the next tick for the same asset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceTick {
    pub asset: Asset,
    pub price: Decimal,
    /// Rolling 24h change, in percent (`2.34` means +2.34%).
    pub pct_change_24h: Decimal,
    pub observed_at: DateTime<Utc>,
    /// Feed that produced the tick (`binance`, `coingecko`).
    pub source: String,
}

impl PriceTick {
    pub fn new(
        asset: Asset,
        price: Decimal,
        pct_change_24h: Decimal,
        observed_at: DateTime<Utc>,
        source: impl Into<String>,
    ) -> Self {
        Self {
            asset,
            price,
            pct_change_24h,
            observed_at,
            source: source.into(),
        }
    }
}

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::Asset;

/// Auxiliary venue queried for alert enrichment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VenueId {
    Variational,
    Extended,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown platform: {0}")]
pub struct UnknownVenue(pub String);

impl VenueId {
    pub fn as_str(&self) -> &'static str {
        match self {
            VenueId::Variational => "variational",
            VenueId::Extended => "extended",
        }
    }

    /// Title-cased name for message headers.
    pub fn display_name(&self) -> &'static str {
        match self {
            VenueId::Variational => "Variational",
            VenueId::Extended => "Extended",
        }
    }
}

impl fmt::Display for VenueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VenueId {
    type Err = UnknownVenue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "variational" => Ok(VenueId::Variational),
            "extended" => Ok(VenueId::Extended),
            other => Err(UnknownVenue(other.to_string())),
        }
    }
}

/// Point-in-time market data for one asset on one venue.
///
/// Fetched fresh for every alert and never cached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichmentSnapshot {
    pub venue: VenueId,
    pub asset: Asset,
    pub mark_price: Decimal,
    pub bid: Option<Decimal>,
    pub ask: Option<Decimal>,
    /// Funding rate in percent per funding interval.
    pub funding_rate_pct: Option<Decimal>,
    pub fetched_at: DateTime<Utc>,
}

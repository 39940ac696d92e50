use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One leg of the monitored pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Asset {
    Btc,
    Eth,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown asset: {0}")]
pub struct UnknownAsset(pub String);

impl Asset {
    pub const ALL: [Asset; 2] = [Asset::Btc, Asset::Eth];

    pub fn symbol(&self) -> &'static str {
        match self {
            Asset::Btc => "BTC",
            Asset::Eth => "ETH",
        }
    }

    /// Spot symbol on Binance (quoted in USDT).
    pub fn binance_symbol(&self) -> &'static str {
        match self {
            Asset::Btc => "BTCUSDT",
            Asset::Eth => "ETHUSDT",
        }
    }

    pub fn from_binance_symbol(symbol: &str) -> Option<Asset> {
        Asset::ALL
            .into_iter()
            .find(|a| a.binance_symbol().eq_ignore_ascii_case(symbol))
    }

    pub fn coingecko_id(&self) -> &'static str {
        match self {
            Asset::Btc => "bitcoin",
            Asset::Eth => "ethereum",
        }
    }

    /// Perpetual market name on venues using `<BASE>-USD` naming.
    pub fn usd_market(&self) -> &'static str {
        match self {
            Asset::Btc => "BTC-USD",
            Asset::Eth => "ETH-USD",
        }
    }
}

impl fmt::Display for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for Asset {
    type Err = UnknownAsset;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "BTC" => Ok(Asset::Btc),
            "ETH" => Ok(Asset::Eth),
            other => Err(UnknownAsset(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn binance_symbols_map_back_to_assets() {
        assert_eq!(Asset::from_binance_symbol("BTCUSDT"), Some(Asset::Btc));
        assert_eq!(Asset::from_binance_symbol("ethusdt"), Some(Asset::Eth));
        assert_eq!(Asset::from_binance_symbol("SOLUSDT"), None);
    }

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!("eth".parse::<Asset>(), Ok(Asset::Eth));
        assert!("doge".parse::<Asset>().is_err());
    }
}

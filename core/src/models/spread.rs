use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::PriceTick;

/// Relative performance of ETH against BTC at one instant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpreadSample {
    pub btc: PriceTick,
    pub eth: PriceTick,
    /// `eth.pct_change_24h - btc.pct_change_24h`, in percentage points.
    pub spread_pct: Decimal,
    pub computed_at: DateTime<Utc>,
}

impl SpreadSample {
    pub fn from_ticks(btc: PriceTick, eth: PriceTick, computed_at: DateTime<Utc>) -> Self {
        let spread_pct = eth.pct_change_24h - btc.pct_change_24h;
        Self {
            btc,
            eth,
            spread_pct,
            computed_at,
        }
    }
}

/// Side of the pair trade suggested by the spread.
///
/// "No direction" is expressed as `Option::<Direction>::None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// ETH outperforming: spread >= +threshold.
    LongBtcShortEth,
    /// ETH underperforming: spread <= -threshold.
    ShortBtcLongEth,
}

impl Direction {
    /// Direction implied by `spread_pct`, if it reaches `threshold` in either sign.
    pub fn classify(spread_pct: Decimal, threshold: Decimal) -> Option<Direction> {
        if spread_pct >= threshold {
            Some(Direction::LongBtcShortEth)
        } else if spread_pct <= -threshold {
            Some(Direction::ShortBtcLongEth)
        } else {
            None
        }
    }

    pub fn opposite(&self) -> Direction {
        match self {
            Direction::LongBtcShortEth => Direction::ShortBtcLongEth,
            Direction::ShortBtcLongEth => Direction::LongBtcShortEth,
        }
    }

    pub fn action_text(&self) -> &'static str {
        match self {
            Direction::LongBtcShortEth => "Long BTC / Short ETH",
            Direction::ShortBtcLongEth => "Short BTC / Long ETH",
        }
    }

    pub fn strategy_label(&self) -> &'static str {
        match self {
            Direction::LongBtcShortEth => "Strategy 1",
            Direction::ShortBtcLongEth => "Strategy 2",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Direction::LongBtcShortEth => "long_btc_short_eth",
            Direction::ShortBtcLongEth => "short_btc_long_eth",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Asset;
    use rust_decimal_macros::dec;

    fn tick(asset: Asset, pct: Decimal) -> PriceTick {
        PriceTick::new(asset, dec!(100), pct, Utc::now(), "test")
    }

    #[test]
    fn spread_is_eth_minus_btc() {
        let s = SpreadSample::from_ticks(
            tick(Asset::Btc, dec!(2.34)),
            tick(Asset::Eth, dec!(4.87)),
            Utc::now(),
        );
        assert_eq!(s.spread_pct, dec!(2.53));
    }

    #[test]
    fn classify_follows_sign_and_is_inclusive() {
        let t = dec!(2.0);
        assert_eq!(
            Direction::classify(dec!(2.0), t),
            Some(Direction::LongBtcShortEth)
        );
        assert_eq!(
            Direction::classify(dec!(-2.0), t),
            Some(Direction::ShortBtcLongEth)
        );
        assert_eq!(Direction::classify(dec!(1.99), t), None);
        assert_eq!(Direction::classify(dec!(-1.99), t), None);
    }

    #[test]
    fn serializes_snake_case() {
        let json = serde_json::to_string(&Direction::ShortBtcLongEth).unwrap();
        assert_eq!(json, "\"short_btc_long_eth\"");
    }
}

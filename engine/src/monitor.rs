//! Spread monitor
//!
//! Keeps the most recent [`PriceTick`] per asset and recomputes the
//! ETH-vs-BTC spread whenever either side updates. Samples whose magnitude
//! exceeds `spread_max` are treated as feed errors and dropped here, so
//! they never reach the state machine.

use chrono::{DateTime, Utc};
use corelib::{Asset, PriceTick, SpreadSample};
use rust_decimal::Decimal;
use tracing::{debug, warn};

use crate::config::{StrategyConfig, StrategyConfigError};

/// Result of feeding one tick into the monitor.
#[derive(Debug, Clone, PartialEq)]
pub enum MonitorOutcome {
    /// The other asset has not ticked yet; nothing to compute.
    Waiting,
    /// |spread| > spread_max. Dropped.
    Anomaly(SpreadSample),
    /// Plausible sample, to be forwarded downstream.
    Accepted(SpreadSample),
}

#[derive(Debug)]
pub struct SpreadMonitor {
    spread_max: Decimal,
    btc: Option<PriceTick>,
    eth: Option<PriceTick>,
    last_spread: Option<Decimal>,
    anomalies_dropped: u64,
}

impl SpreadMonitor {
    pub fn new(config: &StrategyConfig) -> Result<Self, StrategyConfigError> {
        config.validate()?;

        Ok(Self {
            spread_max: config.spread_max,
            btc: None,
            eth: None,
            last_spread: None,
            anomalies_dropped: 0,
        })
    }

    /// Store `tick` (replacing the previous one for its asset) and, once both
    /// assets are known, compute a new sample.
    pub fn on_tick(&mut self, tick: PriceTick, now: DateTime<Utc>) -> MonitorOutcome {
        match tick.asset {
            Asset::Btc => self.btc = Some(tick),
            Asset::Eth => self.eth = Some(tick),
        }

        let (Some(btc), Some(eth)) = (&self.btc, &self.eth) else {
            debug!("waiting for both assets before computing spread");
            return MonitorOutcome::Waiting;
        };

        let sample = SpreadSample::from_ticks(btc.clone(), eth.clone(), now);
        self.last_spread = Some(sample.spread_pct);

        if sample.spread_pct.abs() > self.spread_max {
            self.anomalies_dropped += 1;
            warn!(
                spread_pct = %sample.spread_pct,
                spread_max = %self.spread_max,
                btc_change = %sample.btc.pct_change_24h,
                eth_change = %sample.eth.pct_change_24h,
                dropped_total = self.anomalies_dropped,
                "spread exceeds max threshold, possible anomaly; sample dropped"
            );
            return MonitorOutcome::Anomaly(sample);
        }

        MonitorOutcome::Accepted(sample)
    }

    /// Latest (BTC, ETH) ticks, if both have been seen.
    pub fn latest_pair(&self) -> Option<(PriceTick, PriceTick)> {
        match (&self.btc, &self.eth) {
            (Some(btc), Some(eth)) => Some((btc.clone(), eth.clone())),
            _ => None,
        }
    }

    pub fn last_spread(&self) -> Option<Decimal> {
        self.last_spread
    }

    pub fn anomalies_dropped(&self) -> u64 {
        self.anomalies_dropped
    }
}

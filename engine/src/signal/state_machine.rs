use std::collections::HashMap;

use chrono::{DateTime, Utc};
use corelib::{Direction, SpreadSample};
use rust_decimal::Decimal;
use tracing::{debug, info};

use super::{CloseDecision, EntryDecision, SignalDecision, SpreadConsumer};
use crate::config::{ClosePolicy, StrategyConfig, StrategyConfigError};

const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// The single position the bot is currently tracking.
#[derive(Debug, Clone, PartialEq)]
pub struct OpenSignal {
    pub direction: Direction,
    pub entry_spread_pct: Decimal,
    pub entry_btc_price: Decimal,
    pub entry_eth_price: Decimal,
    pub entry_time: DateTime<Utc>,
    pub last_alert_time: DateTime<Utc>,
}

impl OpenSignal {
    /// Display-only PnL estimate for a pair trade of `size_usd` per leg.
    ///
    /// LongBtcShortEth profits when the spread falls back, ShortBtcLongEth
    /// when it rises back.
    pub fn estimated_pnl(&self, current_spread_pct: Decimal, size_usd: Decimal) -> Decimal {
        let converged = (self.entry_spread_pct - current_spread_pct) / HUNDRED * size_usd;
        match self.direction {
            Direction::LongBtcShortEth => converged,
            Direction::ShortBtcLongEth => -converged,
        }
    }

    /// Whether `spread_pct` has come back inside the close band on this
    /// position's side.
    ///
    /// One-sided: a sample that overshoots past the band into the opposite
    /// side also closes the position, even if it stops short of the
    /// opposite entry threshold.
    pub fn is_normalized(&self, spread_pct: Decimal, close_threshold: Decimal) -> bool {
        match self.direction {
            Direction::LongBtcShortEth => spread_pct <= close_threshold,
            Direction::ShortBtcLongEth => spread_pct >= -close_threshold,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum SignalState {
    #[default]
    Flat,
    Open(OpenSignal),
}

/// Entry/close state machine over accepted spread samples.
///
/// Owns the only copy of the open position and the per-direction cooldown
/// clocks. Never fails on input.
#[derive(Debug)]
pub struct SignalStateMachine {
    config: StrategyConfig,
    state: SignalState,
    last_entry_at: HashMap<Direction, DateTime<Utc>>,
}

impl SignalStateMachine {
    pub fn new(config: StrategyConfig) -> Result<Self, StrategyConfigError> {
        config.validate()?;

        Ok(Self {
            config,
            state: SignalState::Flat,
            last_entry_at: HashMap::new(),
        })
    }

    pub fn config(&self) -> &StrategyConfig {
        &self.config
    }

    pub fn state(&self) -> &SignalState {
        &self.state
    }

    pub fn position(&self) -> Option<&OpenSignal> {
        match &self.state {
            SignalState::Open(pos) => Some(pos),
            SignalState::Flat => None,
        }
    }

    pub fn is_open(&self) -> bool {
        self.position().is_some()
    }

    pub fn last_entry_at(&self, direction: Direction) -> Option<DateTime<Utc>> {
        self.last_entry_at.get(&direction).copied()
    }

    fn try_close(&mut self, sample: &SpreadSample, now: DateTime<Utc>) -> Option<CloseDecision> {
        let SignalState::Open(pos) = &self.state else {
            return None;
        };

        if !pos.is_normalized(sample.spread_pct, self.config.spread_close_threshold) {
            return None;
        }

        let pnl = pos.estimated_pnl(sample.spread_pct, self.config.position_size_usd);

        if self.config.close_policy == ClosePolicy::SpreadAndProfit
            && pnl < self.config.take_profit_usd
        {
            debug!(
                spread_pct = %sample.spread_pct,
                estimated_pnl = %pnl,
                take_profit = %self.config.take_profit_usd,
                "spread normalised but profit target not reached; holding"
            );
            return None;
        }

        let position = pos.clone();
        self.state = SignalState::Flat;

        info!(
            direction = %position.direction,
            entry_spread = %position.entry_spread_pct,
            current_spread = %sample.spread_pct,
            estimated_pnl = %pnl,
            "close signal"
        );

        Some(CloseDecision {
            duration: now - position.entry_time,
            position,
            sample: sample.clone(),
            estimated_pnl_usd: pnl,
            position_size_usd: self.config.position_size_usd,
            decided_at: now,
        })
    }

    fn try_enter(&mut self, sample: &SpreadSample, now: DateTime<Utc>) -> Option<EntryDecision> {
        let direction = Direction::classify(sample.spread_pct, self.config.spread_threshold)?;

        if let Some(last) = self.last_entry_at(direction) {
            let elapsed = now - last;
            if elapsed < self.config.cooldown() {
                debug!(
                    %direction,
                    spread_pct = %sample.spread_pct,
                    elapsed_sec = elapsed.num_seconds(),
                    cooldown_sec = self.config.cooldown_sec,
                    "entry suppressed by cooldown"
                );
                return None;
            }
        }

        self.state = SignalState::Open(OpenSignal {
            direction,
            entry_spread_pct: sample.spread_pct,
            entry_btc_price: sample.btc.price,
            entry_eth_price: sample.eth.price,
            entry_time: now,
            last_alert_time: now,
        });
        self.last_entry_at.insert(direction, now);

        info!(%direction, spread_pct = %sample.spread_pct, "entry signal");

        Some(EntryDecision {
            direction,
            sample: sample.clone(),
            decided_at: now,
        })
    }
}

impl SpreadConsumer for SignalStateMachine {
    /// Evaluate one accepted sample.
    ///
    /// Logic:
    /// 1. While Open, close if the spread has normalised for the open side.
    ///    If it has not, nothing else can happen.
    /// 2. While Flat (including right after a close), enter if the threshold
    ///    is reached and that direction's cooldown has elapsed.
    fn on_sample(&mut self, sample: &SpreadSample, now: DateTime<Utc>) -> Vec<SignalDecision> {
        let mut decisions = Vec::new();

        if self.is_open() {
            match self.try_close(sample, now) {
                Some(close) => decisions.push(SignalDecision::Close(close)),
                None => return decisions,
            }
        }

        if let Some(entry) = self.try_enter(sample, now) {
            decisions.push(SignalDecision::Entry(entry));
        }

        decisions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;
    use corelib::{Asset, PriceTick};
    use rust_decimal_macros::dec;

    fn sample(btc_pct: Decimal, eth_pct: Decimal, at: DateTime<Utc>) -> SpreadSample {
        SpreadSample::from_ticks(
            PriceTick::new(Asset::Btc, dec!(97000), btc_pct, at, "binance"),
            PriceTick::new(Asset::Eth, dec!(3400), eth_pct, at, "binance"),
            at,
        )
    }

    fn machine() -> SignalStateMachine {
        SignalStateMachine::new(StrategyConfig::default()).unwrap()
    }

    #[test]
    fn test_pnl_sign_follows_direction() {
        let t0 = Utc::now();
        let mut pos = OpenSignal {
            direction: Direction::LongBtcShortEth,
            entry_spread_pct: dec!(2.53),
            entry_btc_price: dec!(1),
            entry_eth_price: dec!(1),
            entry_time: t0,
            last_alert_time: t0,
        };
        assert_eq!(pos.estimated_pnl(dec!(0.82), dec!(1000)), dec!(17.1));

        pos.direction = Direction::ShortBtcLongEth;
        pos.entry_spread_pct = dec!(-2.5);
        assert_eq!(pos.estimated_pnl(dec!(-0.5), dec!(1000)), dec!(20));
    }

    #[test]
    fn test_short_side_closes_on_rise_back() {
        let t0 = Utc::now();
        let mut sm = machine();

        let d = sm.on_sample(&sample(dec!(3.0), dec!(0.5), t0), t0);
        assert!(matches!(d.as_slice(), [SignalDecision::Entry(e)] if e.direction == Direction::ShortBtcLongEth));

        // still beyond -close
        assert!(sm.on_sample(&sample(dec!(2.0), dec!(0.5), t0), t0).is_empty());

        let d = sm.on_sample(&sample(dec!(1.0), dec!(0.5), t0), t0);
        assert!(matches!(d.as_slice(), [SignalDecision::Close(_)]));
        assert!(!sm.is_open());
    }

    #[test]
    fn test_overshoot_closes_then_enters_opposite() {
        let t0 = Utc::now();
        let mut sm = machine();

        sm.on_sample(&sample(dec!(0.0), dec!(2.5), t0), t0);
        let t1 = t0 + TimeDelta::seconds(30);
        let d = sm.on_sample(&sample(dec!(3.0), dec!(0.0), t1), t1);

        assert_eq!(d.len(), 2);
        assert!(d[0].is_close());
        assert_eq!(d[0].direction(), Direction::LongBtcShortEth);
        assert!(d[1].is_entry());
        assert_eq!(d[1].direction(), Direction::ShortBtcLongEth);
        assert_eq!(
            sm.position().map(|p| p.direction),
            Some(Direction::ShortBtcLongEth)
        );
    }

    #[test]
    fn test_overshoot_does_not_reenter_cooling_direction() {
        let t0 = Utc::now();
        let mut sm = machine();

        sm.on_sample(&sample(dec!(2.5), dec!(0.0), t0), t0);
        let closed_at = t0 + TimeDelta::seconds(30);
        let d = sm.on_sample(&sample(dec!(0.2), dec!(0.0), closed_at), closed_at);
        assert!(d[0].is_close());
        let t1 = t0 + TimeDelta::seconds(60);
        sm.on_sample(&sample(dec!(0.0), dec!(2.5), t1), t1);

        let t2 = t0 + TimeDelta::seconds(100);
        let d = sm.on_sample(&sample(dec!(3.0), dec!(0.0), t2), t2);

        assert_eq!(d.len(), 1);
        assert!(d[0].is_close());
        assert!(!sm.is_open());
        assert_eq!(sm.last_entry_at(Direction::ShortBtcLongEth), Some(t0));
    }

    #[test]
    fn test_profit_gate_holds_position() {
        let cfg = StrategyConfig {
            close_policy: ClosePolicy::SpreadAndProfit,
            take_profit_usd: dec!(25),
            ..StrategyConfig::default()
        };
        let mut sm = SignalStateMachine::new(cfg).unwrap();
        let t0 = Utc::now();

        sm.on_sample(&sample(dec!(0.0), dec!(2.53), t0), t0);

        // pnl = 17.1 < 25
        assert!(sm.on_sample(&sample(dec!(0.0), dec!(0.82), t0), t0).is_empty());
        assert!(sm.is_open());

        // pnl = 35.3
        let d = sm.on_sample(&sample(dec!(0.0), dec!(-1.0), t0), t0);
        assert!(matches!(d.as_slice(), [SignalDecision::Close(c)] if c.estimated_pnl_usd == dec!(35.3)));
    }

    #[test]
    fn test_close_records_duration_and_entry_prices() {
        let t0 = Utc::now();
        let mut sm = machine();
        sm.on_sample(&sample(dec!(0.0), dec!(2.2), t0), t0);

        let t1 = t0 + TimeDelta::minutes(95);
        let d = sm.on_sample(&sample(dec!(0.0), dec!(0.5), t1), t1);

        let SignalDecision::Close(close) = &d[0] else {
            panic!("expected close");
        };
        assert_eq!(close.duration, TimeDelta::minutes(95));
        assert_eq!(close.position.entry_btc_price, dec!(97000));
        assert_eq!(close.position.entry_time, t0);
        assert_eq!(close.position_size_usd, dec!(1000));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let cfg = StrategyConfig {
            spread_threshold: dec!(-1),
            ..StrategyConfig::default()
        };
        assert_eq!(
            SignalStateMachine::new(cfg).unwrap_err(),
            StrategyConfigError::NonPositiveThreshold(dec!(-1))
        );
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use chrono::TimeDelta;
    use corelib::{Asset, PriceTick};
    use proptest::prelude::*;

    // Spreads are generated in hundredths of a percent.
    fn sample_at(spread_cents: i64, at: DateTime<Utc>) -> SpreadSample {
        SpreadSample::from_ticks(
            PriceTick::new(Asset::Btc, Decimal::new(97_000, 0), Decimal::ZERO, at, "binance"),
            PriceTick::new(
                Asset::Eth,
                Decimal::new(3_400, 0),
                Decimal::new(spread_cents, 2),
                at,
                "binance",
            ),
            at,
        )
    }

    fn machine() -> SignalStateMachine {
        SignalStateMachine::new(StrategyConfig::default()).unwrap()
    }

    fn eligible() -> impl Strategy<Value = i64> {
        prop_oneof![200i64..=800, -800i64..=-200]
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(500))]

        #[test]
        fn test_flat_below_threshold_never_enters(spread in -199i64..=199) {
            let mut sm = machine();
            let now = Utc::now();

            prop_assert!(sm.on_sample(&sample_at(spread, now), now).is_empty());
            prop_assert!(!sm.is_open());
        }

        #[test]
        fn test_flat_at_threshold_enters_once_with_sign(spread in eligible()) {
            let mut sm = machine();
            let now = Utc::now();

            let d = sm.on_sample(&sample_at(spread, now), now);
            prop_assert_eq!(d.len(), 1);

            let expected = if spread > 0 {
                Direction::LongBtcShortEth
            } else {
                Direction::ShortBtcLongEth
            };
            prop_assert!(d[0].is_entry());
            prop_assert_eq!(d[0].direction(), expected);
        }

        #[test]
        fn test_open_never_reenters(
            first in 200i64..=800,
            rest in prop::collection::vec(101i64..=800, 1..30),
        ) {
            let mut sm = machine();
            let t0 = Utc::now();
            sm.on_sample(&sample_at(first, t0), t0);

            for (i, spread) in rest.into_iter().enumerate() {
                let t = t0 + TimeDelta::seconds(i as i64 * 600);
                prop_assert!(sm.on_sample(&sample_at(spread, t), t).is_empty());
            }
            prop_assert!(sm.is_open());
        }

        #[test]
        fn test_normalised_spread_closes_exactly_once(
            entry in eligible(),
            close in -100i64..=100,
        ) {
            let mut sm = machine();
            let t0 = Utc::now();
            sm.on_sample(&sample_at(entry, t0), t0);

            let t1 = t0 + TimeDelta::seconds(10);
            let d = sm.on_sample(&sample_at(close, t1), t1);

            prop_assert_eq!(d.len(), 1);
            prop_assert!(d[0].is_close());
            prop_assert!(!sm.is_open());
            prop_assert!(sm.on_sample(&sample_at(close, t1), t1).is_empty());
        }

        #[test]
        fn test_cooldown_is_per_direction(
            entry in 200i64..=800,
            again in 200i64..=800,
            opposite in -800i64..=-200,
            gap in 1i64..300,
        ) {
            let mut sm = machine();
            let t0 = Utc::now();
            sm.on_sample(&sample_at(entry, t0), t0);
            sm.on_sample(&sample_at(0, t0), t0);

            let t1 = t0 + TimeDelta::seconds(gap);
            prop_assert!(sm.on_sample(&sample_at(again, t1), t1).is_empty());

            let d = sm.on_sample(&sample_at(opposite, t1), t1);
            prop_assert_eq!(d.len(), 1);
            prop_assert_eq!(d[0].direction(), Direction::ShortBtcLongEth);
        }
    }
}

mod support;

use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use corelib::{Asset, Direction, PriceTick};
use engine::{
    SignalDecision, SignalPipeline, SignalStateMachine, SpreadMonitor, StrategyConfig,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use support::SpyConsumer;

fn t(secs: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap() + TimeDelta::seconds(secs)
}

fn btc(pct: Decimal, at: DateTime<Utc>) -> PriceTick {
    PriceTick::new(Asset::Btc, dec!(97250.50), pct, at, "binance")
}

fn eth(pct: Decimal, at: DateTime<Utc>) -> PriceTick {
    PriceTick::new(Asset::Eth, dec!(3412.75), pct, at, "binance")
}

fn pipeline() -> SignalPipeline<SignalStateMachine> {
    SignalPipeline::from_config(StrategyConfig::default()).unwrap()
}

// ---------------------------------------------------------
// Scenario A: ETH outperforming opens Long BTC / Short ETH
// ---------------------------------------------------------
#[test]
fn test_scenario_a_entry_long_btc_short_eth() {
    let mut p = pipeline();

    assert!(p.process_tick(btc(dec!(2.34), t(0)), t(0)).is_empty());
    let d = p.process_tick(eth(dec!(4.87), t(0)), t(0));

    assert_eq!(d.len(), 1);
    let SignalDecision::Entry(entry) = &d[0] else {
        panic!("expected entry, got {:?}", d[0]);
    };
    assert_eq!(entry.direction, Direction::LongBtcShortEth);
    assert_eq!(entry.sample.spread_pct, dec!(2.53));

    let pos = p.consumer().position().unwrap();
    assert_eq!(pos.entry_spread_pct, dec!(2.53));
    assert_eq!(pos.entry_time, t(0));
    assert_eq!(pos.last_alert_time, t(0));
}

// ---------------------------------------------------------
// Scenario B: spread falls back under the close band
// ---------------------------------------------------------
#[test]
fn test_scenario_b_close_after_normalisation() {
    let mut p = pipeline();
    p.process_tick(btc(dec!(2.34), t(0)), t(0));
    p.process_tick(eth(dec!(4.87), t(0)), t(0));

    let later = t(2 * 3600 + 15 * 60);
    let d = p.process_tick(eth(dec!(3.16), later), later);

    assert_eq!(d.len(), 1);
    let SignalDecision::Close(close) = &d[0] else {
        panic!("expected close, got {:?}", d[0]);
    };
    assert_eq!(close.sample.spread_pct, dec!(0.82));
    assert_eq!(close.duration, TimeDelta::minutes(135));
    assert!(close.estimated_pnl_usd > Decimal::ZERO);
    assert_eq!(close.estimated_pnl_usd, dec!(17.1));
    assert!(!p.consumer().is_open());
}

// ---------------------------------------------------------
// Scenario C: anomalous spread is dropped before the machine
// ---------------------------------------------------------
#[test]
fn test_scenario_c_anomaly_causes_no_transition() {
    let mut p = pipeline();
    p.process_tick(btc(dec!(0.5), t(0)), t(0));

    let d = p.process_tick(eth(dec!(9.5), t(1)), t(1));

    assert!(d.is_empty());
    assert!(!p.consumer().is_open());
    assert_eq!(p.monitor().anomalies_dropped(), 1);
    assert!(p.consumer().last_entry_at(Direction::LongBtcShortEth).is_none());
}

// ---------------------------------------------------------
// Scenario D: no second entry while open, even past threshold
// ---------------------------------------------------------
#[test]
fn test_scenario_d_no_reentry_within_cooldown() {
    let mut p = pipeline();
    p.process_tick(btc(dec!(0.0), t(0)), t(0));
    assert_eq!(p.process_tick(eth(dec!(2.5), t(0)), t(0)).len(), 1);

    let d = p.process_tick(eth(dec!(3.1), t(100)), t(100));

    assert!(d.is_empty());
    assert_eq!(
        p.consumer().last_entry_at(Direction::LongBtcShortEth),
        Some(t(0))
    );
}

#[test]
fn test_same_direction_reentry_waits_for_cooldown() {
    let mut p = pipeline();
    p.process_tick(btc(dec!(0.0), t(0)), t(0));
    p.process_tick(eth(dec!(2.5), t(0)), t(0));

    // close at t=60
    assert!(p.process_tick(eth(dec!(0.2), t(60)), t(60))[0].is_close());

    // flat again but still cooling down
    assert!(p.process_tick(eth(dec!(2.6), t(200)), t(200)).is_empty());

    // opposite side is unaffected
    let d = p.process_tick(eth(dec!(-2.4), t(210)), t(210));
    assert_eq!(d[0].direction(), Direction::ShortBtcLongEth);

    // close the short, then long is allowed again once 300 s have passed
    assert!(p.process_tick(eth(dec!(-0.1), t(250)), t(250))[0].is_close());
    assert!(p.process_tick(eth(dec!(2.2), t(299)), t(299)).is_empty());
    let d = p.process_tick(eth(dec!(2.2), t(300)), t(300));
    assert!(d[0].is_entry());
    assert_eq!(d[0].direction(), Direction::LongBtcShortEth);
}

#[test]
fn test_overshoot_emits_close_then_opposite_entry() {
    let mut p = pipeline();
    p.process_tick(btc(dec!(0.0), t(0)), t(0));
    p.process_tick(eth(dec!(2.5), t(0)), t(0));

    let d = p.process_tick(eth(dec!(-3.0), t(30)), t(30));

    assert_eq!(d.len(), 2);
    assert!(d[0].is_close());
    assert!(d[1].is_entry());
    assert_eq!(d[1].direction(), Direction::ShortBtcLongEth);
}

#[test]
fn test_overshoot_into_cooling_side_only_closes() {
    let mut p = pipeline();
    p.process_tick(btc(dec!(0.0), t(0)), t(0));

    // short opened at t=0 starts that side's cooldown
    assert!(p.process_tick(eth(dec!(-2.5), t(0)), t(0))[0].is_entry());
    assert!(p.process_tick(eth(dec!(-0.2), t(30)), t(30))[0].is_close());
    let d = p.process_tick(eth(dec!(2.5), t(60)), t(60));
    assert_eq!(d[0].direction(), Direction::LongBtcShortEth);

    let d = p.process_tick(eth(dec!(-3.0), t(100)), t(100));

    assert_eq!(d.len(), 1);
    assert!(d[0].is_close());
    assert_eq!(d[0].direction(), Direction::LongBtcShortEth);
    assert!(!p.consumer().is_open());
}

#[test]
fn test_anomalies_never_reach_consumer() {
    let monitor = SpreadMonitor::new(&StrategyConfig::default()).unwrap();
    let mut p = SignalPipeline::new(monitor, SpyConsumer::default());

    p.process_tick(btc(dec!(0.0), t(0)), t(0));
    for (i, pct) in [dec!(8.01), dec!(-12.0), dec!(3.0), dec!(40.0), dec!(-8.0)]
        .into_iter()
        .enumerate()
    {
        let at = t(i as i64 + 1);
        p.process_tick(eth(pct, at), at);
    }

    let seen: Vec<Decimal> = p.consumer().seen.iter().map(|s| s.spread_pct).collect();
    assert_eq!(seen, vec![dec!(3.0), dec!(-8.0)]);
    assert_eq!(p.monitor().anomalies_dropped(), 3);
}

use chrono::{DateTime, Utc};
use corelib::Direction;
use engine::OpenSignal;
use rust_decimal::Decimal;
use serde::Serialize;

/// Summary of the open position, if any.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PositionSummary {
    pub direction: Direction,
    pub entry_spread_pct: Decimal,
    pub entry_time: DateTime<Utc>,
}

impl From<&OpenSignal> for PositionSummary {
    fn from(p: &OpenSignal) -> Self {
        Self {
            direction: p.direction,
            entry_spread_pct: p.entry_spread_pct,
            entry_time: p.entry_time,
        }
    }
}

/// Point-in-time view of the runner, published after every tick.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BotStatus {
    pub running: bool,
    pub feed: Option<String>,
    pub last_spread_pct: Option<Decimal>,
    pub position: Option<PositionSummary>,
    pub notifiers: Vec<&'static str>,
    pub venues: Vec<String>,
    pub ticks_processed: u64,
    pub last_tick_at: Option<DateTime<Utc>>,
    pub anomalies_dropped: u64,
    pub entries_emitted: u64,
    pub closes_emitted: u64,
    pub alert_build_failures: u64,
}

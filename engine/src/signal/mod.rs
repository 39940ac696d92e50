pub mod state_machine;

use chrono::{DateTime, TimeDelta, Utc};
use corelib::{Direction, SpreadSample};
use rust_decimal::Decimal;

pub use state_machine::OpenSignal;

/// Output of the state machine for one accepted sample.
#[derive(Debug, Clone, PartialEq)]
pub enum SignalDecision {
    Entry(EntryDecision),
    Close(CloseDecision),
}

impl SignalDecision {
    pub fn direction(&self) -> Direction {
        match self {
            SignalDecision::Entry(e) => e.direction,
            SignalDecision::Close(c) => c.position.direction,
        }
    }

    pub fn sample(&self) -> &SpreadSample {
        match self {
            SignalDecision::Entry(e) => &e.sample,
            SignalDecision::Close(c) => &c.sample,
        }
    }

    pub fn is_entry(&self) -> bool {
        matches!(self, SignalDecision::Entry(_))
    }

    pub fn is_close(&self) -> bool {
        matches!(self, SignalDecision::Close(_))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EntryDecision {
    pub direction: Direction,
    pub sample: SpreadSample,
    pub decided_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CloseDecision {
    /// The position as it was just before closing.
    pub position: OpenSignal,
    pub sample: SpreadSample,
    pub duration: TimeDelta,
    pub estimated_pnl_usd: Decimal,
    pub position_size_usd: Decimal,
    pub decided_at: DateTime<Utc>,
}

/// Anything that turns accepted spread samples into signal decisions.
///
/// Implemented by [`state_machine::SignalStateMachine`]; the pipeline is
/// generic over it so tests can observe exactly which samples get through.
pub trait SpreadConsumer {
    fn on_sample(&mut self, sample: &SpreadSample, now: DateTime<Utc>) -> Vec<SignalDecision>;
}

use chrono::{DateTime, TimeDelta, Utc};
use common::logger::TraceId;
use rust_decimal::Decimal;

use super::{Direction, EnrichmentSnapshot, PriceTick, VenueId};

/// What the alert tells the operator to do.
#[derive(Debug, Clone, PartialEq)]
pub enum AlertKind {
    Entry {
        direction: Direction,
    },
    Close {
        direction: Direction,
        entry_spread_pct: Decimal,
        current_spread_pct: Decimal,
        duration: TimeDelta,
        /// Display estimate only.
        estimated_pnl_usd: Decimal,
        position_size_usd: Decimal,
        entry_btc_price: Decimal,
        entry_eth_price: Decimal,
    },
}

impl AlertKind {
    pub fn label(&self) -> &'static str {
        match self {
            AlertKind::Entry { .. } => "entry",
            AlertKind::Close { .. } => "close",
        }
    }

    pub fn direction(&self) -> Direction {
        match self {
            AlertKind::Entry { direction } | AlertKind::Close { direction, .. } => *direction,
        }
    }
}

/// Enrichment for one venue. Present only when at least one asset was fetched.
#[derive(Debug, Clone, PartialEq)]
pub struct VenueBlock {
    pub venue: VenueId,
    pub btc: Option<EnrichmentSnapshot>,
    pub eth: Option<EnrichmentSnapshot>,
}

impl VenueBlock {
    pub fn is_empty(&self) -> bool {
        self.btc.is_none() && self.eth.is_none()
    }
}

/// Fully assembled notification. Immutable once built.
#[derive(Debug, Clone)]
pub struct AlertPayload {
    pub trace_id: TraceId,
    pub kind: AlertKind,
    pub reason: String,
    /// Signal-source ticks the decision was made on.
    pub btc: PriceTick,
    pub eth: PriceTick,
    pub spread_pct: Decimal,
    /// Ordered like the configured platform list.
    pub venues: Vec<VenueBlock>,
    pub generated_at: DateTime<Utc>,
}

impl AlertPayload {
    pub fn is_entry(&self) -> bool {
        matches!(self.kind, AlertKind::Entry { .. })
    }

    pub fn is_close(&self) -> bool {
        matches!(self.kind, AlertKind::Close { .. })
    }

    pub fn venue(&self, venue: VenueId) -> Option<&VenueBlock> {
        self.venues.iter().find(|b| b.venue == venue)
    }
}

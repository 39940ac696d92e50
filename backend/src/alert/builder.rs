//! Turns a [`SignalDecision`] into a finished [`AlertPayload`].
//!
//! Every configured venue is queried concurrently for BTC and ETH under a
//! single per-venue deadline. Whatever arrived in time goes into the payload;
//! a venue that produced nothing is left out. The payload is complete before
//! any notifier sees it.

use std::sync::Arc;
use std::time::Duration;

use adapters::EnrichmentSource;
use common::logger::{TraceId, child_span, root_span, warn_if_slow};
use corelib::{AlertKind, AlertPayload, Asset, EnrichmentSnapshot, PriceTick, VenueBlock, VenueId};
use engine::SignalDecision;
use futures::future::join_all;
use tracing::{Instrument, field, info, warn};

use super::reason::reason_for;
use crate::error::AlertError;

/// Fan-outs slower than the venue deadline plus this margin are reported.
const SLOW_MARGIN: Duration = Duration::from_millis(500);

pub struct AlertBuilder {
    sources: Vec<Arc<dyn EnrichmentSource>>,
    venue_timeout: Duration,
}

impl AlertBuilder {
    /// `sources` keep their order in the rendered alert.
    pub fn new(sources: Vec<Arc<dyn EnrichmentSource>>, venue_timeout: Duration) -> Self {
        Self {
            sources,
            venue_timeout,
        }
    }

    pub fn venues(&self) -> Vec<VenueId> {
        self.sources.iter().map(|s| s.venue()).collect()
    }

    /// Assemble the payload for `decision`.
    ///
    /// `latest_pair` is the signal-source (BTC, ETH) pair the decision was
    /// made on; without it there is nothing to report.
    pub async fn build(
        &self,
        decision: &SignalDecision,
        latest_pair: Option<(PriceTick, PriceTick)>,
    ) -> Result<AlertPayload, AlertError> {
        let (btc, eth) = latest_pair.ok_or(AlertError::MissingSignalSource)?;

        let trace_id = TraceId::default();
        let kind = alert_kind(decision);
        let spread_pct = decision.sample().spread_pct;

        let span = root_span("alert_build", &trace_id);
        span.record("kind", kind.label());
        span.record("direction", field::display(kind.direction()));

        let limit = self.venue_timeout + SLOW_MARGIN;
        let venues = warn_if_slow("venue_enrichment", limit, self.enrich_all())
            .instrument(span.clone())
            .await;

        let payload = AlertPayload {
            reason: reason_for(&kind, spread_pct),
            trace_id,
            kind,
            btc,
            eth,
            spread_pct,
            venues,
            generated_at: decision_time(decision),
        };

        span.in_scope(|| {
            info!(
                spread_pct = %payload.spread_pct,
                venues = payload.venues.len(),
                "alert built"
            )
        });

        Ok(payload)
    }

    async fn enrich_all(&self) -> Vec<VenueBlock> {
        let fetches = self.sources.iter().map(|source| {
            let span = child_span("venue_enrichment");
            span.record("venue", source.venue().as_str());
            self.enrich_venue(source.as_ref()).instrument(span)
        });

        // join_all yields in input order, which is the configured order.
        join_all(fetches).await.into_iter().flatten().collect()
    }

    async fn enrich_venue(&self, source: &dyn EnrichmentSource) -> Option<VenueBlock> {
        let venue = source.venue();

        let both = async {
            tokio::join!(source.snapshot(Asset::Btc), source.snapshot(Asset::Eth))
        };

        let (btc, eth) = match tokio::time::timeout(self.venue_timeout, both).await {
            Ok(pair) => pair,
            Err(_) => {
                warn!(
                    venue = %venue,
                    timeout_ms = self.venue_timeout.as_millis() as u64,
                    "venue enrichment timed out; block omitted"
                );
                return None;
            }
        };

        let block = VenueBlock {
            venue,
            btc: keep(venue, Asset::Btc, btc),
            eth: keep(venue, Asset::Eth, eth),
        };

        if block.is_empty() {
            warn!(venue = %venue, "no enrichment data from venue; block omitted");
            return None;
        }

        Some(block)
    }
}

fn keep(
    venue: VenueId,
    asset: Asset,
    result: Result<EnrichmentSnapshot, adapters::VenueError>,
) -> Option<EnrichmentSnapshot> {
    match result {
        Ok(snapshot) => Some(snapshot),
        Err(e) => {
            warn!(venue = %venue, asset = %asset, error = ?e, "venue snapshot failed");
            None
        }
    }
}

fn alert_kind(decision: &SignalDecision) -> AlertKind {
    match decision {
        SignalDecision::Entry(e) => AlertKind::Entry {
            direction: e.direction,
        },
        SignalDecision::Close(c) => AlertKind::Close {
            direction: c.position.direction,
            entry_spread_pct: c.position.entry_spread_pct,
            current_spread_pct: c.sample.spread_pct,
            duration: c.duration,
            estimated_pnl_usd: c.estimated_pnl_usd,
            position_size_usd: c.position_size_usd,
            entry_btc_price: c.position.entry_btc_price,
            entry_eth_price: c.position.entry_eth_price,
        },
    }
}

fn decision_time(decision: &SignalDecision) -> chrono::DateTime<chrono::Utc> {
    match decision {
        SignalDecision::Entry(e) => e.decided_at,
        SignalDecision::Close(c) => c.decided_at,
    }
}

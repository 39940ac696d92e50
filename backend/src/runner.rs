//! Tick runner
//!
//! Sole consumer of the feed channel. Each tick goes through the signal
//! pipeline; every decision becomes an alert that is built here and handed
//! to a detached dispatch task, so a slow notifier never holds up the next
//! tick.

use std::sync::Arc;
use std::time::Duration;

use adapters::Notifier;
use chrono::{DateTime, TimeDelta, Utc};
use corelib::PriceTick;
use engine::{Clock, SignalDecision, SignalPipeline, SignalStateMachine, SystemClock};
use rust_decimal::Decimal;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::alert::AlertBuilder;
use crate::dispatch::{DispatchReport, spawn_dispatch};
use crate::status::{BotStatus, PositionSummary};

/// Share of the entry threshold from which a sample counts as "approaching".
const APPROACH_RATIO: Decimal = Decimal::from_parts(75, 0, 0, false, 2);

#[derive(Clone, Debug)]
pub struct RunnerSettings {
    /// Log every accepted sample instead of a periodic heartbeat.
    pub debug_mode: bool,
    pub heartbeat: Duration,
    /// Name of the active price feed, reported in the status.
    pub feed: String,
}

impl Default for RunnerSettings {
    fn default() -> Self {
        Self {
            debug_mode: false,
            heartbeat: Duration::from_secs(60),
            feed: String::new(),
        }
    }
}

pub struct SignalRunner<K: Clock = SystemClock> {
    pipeline: SignalPipeline<SignalStateMachine>,
    builder: AlertBuilder,
    notifiers: Arc<Vec<Arc<dyn Notifier>>>,
    clock: K,
    debug_mode: bool,
    heartbeat: TimeDelta,
    last_heartbeat: Option<DateTime<Utc>>,
    status: BotStatus,
    status_tx: watch::Sender<BotStatus>,
}

impl<K: Clock> SignalRunner<K> {
    pub fn new(
        pipeline: SignalPipeline<SignalStateMachine>,
        builder: AlertBuilder,
        notifiers: Vec<Arc<dyn Notifier>>,
        clock: K,
        settings: RunnerSettings,
    ) -> Self {
        let status = BotStatus {
            feed: (!settings.feed.is_empty()).then(|| settings.feed.clone()),
            notifiers: notifiers.iter().map(|n| n.name()).collect(),
            venues: builder.venues().iter().map(|v| v.to_string()).collect(),
            ..BotStatus::default()
        };
        let (status_tx, _) = watch::channel(status.clone());

        Self {
            pipeline,
            builder,
            notifiers: Arc::new(notifiers),
            clock,
            debug_mode: settings.debug_mode,
            heartbeat: TimeDelta::from_std(settings.heartbeat).unwrap_or(TimeDelta::seconds(60)),
            last_heartbeat: None,
            status,
            status_tx,
        }
    }

    pub fn status(&self) -> &BotStatus {
        &self.status
    }

    /// Receives a fresh [`BotStatus`] after every tick.
    pub fn subscribe_status(&self) -> watch::Receiver<BotStatus> {
        self.status_tx.subscribe()
    }

    pub fn pipeline(&self) -> &SignalPipeline<SignalStateMachine> {
        &self.pipeline
    }

    /// Consume ticks until every sender is gone.
    pub async fn run(mut self, mut ticks: mpsc::Receiver<PriceTick>) -> BotStatus {
        self.status.running = true;
        self.publish();
        info!(
            notifiers = ?self.status.notifiers,
            venues = ?self.status.venues,
            debug_mode = self.debug_mode,
            "signal runner started"
        );

        while let Some(tick) = ticks.recv().await {
            // Dispatch tasks are detached; their handles are only useful in tests.
            let _ = self.handle_tick(tick).await;
        }

        self.status.running = false;
        self.publish();
        info!("tick channel closed; signal runner stopped");
        self.status
    }

    /// Process one tick. Returns the handles of any dispatch tasks started.
    pub async fn handle_tick(&mut self, tick: PriceTick) -> Vec<JoinHandle<DispatchReport>> {
        let now = self.clock.now();
        let decisions = self.pipeline.process_tick(tick, now);

        self.status.ticks_processed += 1;
        self.status.last_tick_at = Some(now);
        self.log_progress(now);

        let mut handles = Vec::with_capacity(decisions.len());
        for decision in decisions {
            if let Some(handle) = self.emit(&decision).await {
                handles.push(handle);
            }
        }

        self.refresh_status();
        handles
    }

    async fn emit(&mut self, decision: &SignalDecision) -> Option<JoinHandle<DispatchReport>> {
        let latest = self.pipeline.monitor().latest_pair();

        match self.builder.build(decision, latest).await {
            Ok(payload) => {
                match decision {
                    SignalDecision::Entry(_) => self.status.entries_emitted += 1,
                    SignalDecision::Close(_) => self.status.closes_emitted += 1,
                }
                Some(spawn_dispatch(Arc::clone(&self.notifiers), Arc::new(payload)))
            }
            Err(e) => {
                self.status.alert_build_failures += 1;
                error!(error = %e, direction = %decision.direction(), "alert not built");
                None
            }
        }
    }

    fn log_progress(&mut self, now: DateTime<Utc>) {
        let Some(spread) = self.pipeline.monitor().last_spread() else {
            return;
        };
        let config = self.pipeline.consumer().config();
        let position = self.pipeline.consumer().position().map(|p| p.direction);

        if self.debug_mode {
            if spread.abs() > config.spread_max {
                return;
            }
            let state = if spread.abs() >= config.spread_threshold * APPROACH_RATIO {
                "approaching threshold"
            } else {
                "normal range"
            };
            info!(
                spread_pct = %spread.round_dp(2),
                threshold = %config.spread_threshold,
                position = ?position,
                "{state}"
            );
            return;
        }

        let due = self
            .last_heartbeat
            .is_none_or(|last| now - last >= self.heartbeat);
        if due {
            self.last_heartbeat = Some(now);
            info!(
                spread_pct = %spread.round_dp(2),
                position = ?position,
                ticks = self.status.ticks_processed,
                anomalies = self.pipeline.monitor().anomalies_dropped(),
                "heartbeat"
            );
        } else {
            debug!(spread_pct = %spread, "tick processed");
        }
    }

    fn refresh_status(&mut self) {
        self.status.last_spread_pct = self.pipeline.monitor().last_spread();
        self.status.anomalies_dropped = self.pipeline.monitor().anomalies_dropped();
        self.status.position = self.pipeline.consumer().position().map(PositionSummary::from);
        self.publish();
    }

    fn publish(&self) {
        self.status_tx.send_replace(self.status.clone());
    }
}

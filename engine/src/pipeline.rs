use chrono::{DateTime, Utc};
use corelib::PriceTick;

use crate::config::{StrategyConfig, StrategyConfigError};
use crate::monitor::{MonitorOutcome, SpreadMonitor};
use crate::signal::state_machine::SignalStateMachine;
use crate::signal::{SignalDecision, SpreadConsumer};

/// `SpreadMonitor -> SpreadConsumer`, driven one tick at a time.
pub struct SignalPipeline<C: SpreadConsumer> {
    monitor: SpreadMonitor,
    consumer: C,
}

impl<C: SpreadConsumer> SignalPipeline<C> {
    pub fn new(monitor: SpreadMonitor, consumer: C) -> Self {
        Self { monitor, consumer }
    }

    /// Feed one tick. Only accepted samples reach the consumer.
    pub fn process_tick(&mut self, tick: PriceTick, now: DateTime<Utc>) -> Vec<SignalDecision> {
        match self.monitor.on_tick(tick, now) {
            MonitorOutcome::Accepted(sample) => self.consumer.on_sample(&sample, now),
            MonitorOutcome::Waiting | MonitorOutcome::Anomaly(_) => Vec::new(),
        }
    }

    pub fn monitor(&self) -> &SpreadMonitor {
        &self.monitor
    }

    pub fn consumer(&self) -> &C {
        &self.consumer
    }

    pub fn consumer_mut(&mut self) -> &mut C {
        &mut self.consumer
    }
}

impl SignalPipeline<SignalStateMachine> {
    pub fn from_config(config: StrategyConfig) -> Result<Self, StrategyConfigError> {
        let monitor = SpreadMonitor::new(&config)?;
        let machine = SignalStateMachine::new(config)?;
        Ok(Self::new(monitor, machine))
    }
}

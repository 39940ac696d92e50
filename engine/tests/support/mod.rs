use chrono::{DateTime, Utc};
use corelib::SpreadSample;
use engine::{SignalDecision, SpreadConsumer};

/// Records every sample that reaches it and never decides anything.
#[derive(Default)]
pub struct SpyConsumer {
    pub seen: Vec<SpreadSample>,
}

impl SpreadConsumer for SpyConsumer {
    fn on_sample(&mut self, sample: &SpreadSample, _now: DateTime<Utc>) -> Vec<SignalDecision> {
        self.seen.push(sample.clone());
        Vec::new()
    }
}

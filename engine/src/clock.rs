use chrono::{DateTime, Utc};

/// Source of "now" for the processing loop.
///
/// The engine never reads the wall clock itself; callers pass timestamps in,
/// which keeps cooldown and duration logic deterministic under test.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

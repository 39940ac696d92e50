pub mod clock;
pub mod config;
pub mod monitor;
pub mod pipeline;
pub mod signal;

pub use clock::{Clock, SystemClock};
pub use config::{ClosePolicy, StrategyConfig, StrategyConfigError};
pub use monitor::{MonitorOutcome, SpreadMonitor};
pub use pipeline::SignalPipeline;
pub use signal::{
    CloseDecision, EntryDecision, SignalDecision, SpreadConsumer,
    state_machine::{OpenSignal, SignalState, SignalStateMachine},
};

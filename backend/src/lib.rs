pub mod alert;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod feed;
pub mod health;
pub mod runner;
pub mod status;
pub mod wiring;

pub use alert::AlertBuilder;
pub use config::AppConfig;
pub use dispatch::{DispatchReport, dispatch, spawn_dispatch};
pub use error::{AlertError, ConfigError};
pub use runner::SignalRunner;
pub use status::BotStatus;

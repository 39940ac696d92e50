use once_cell::sync::OnceCell;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

static LOGGER_INIT: OnceCell<()> = OnceCell::new();

/// Output format of the process-wide subscriber.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogFormat {
    /// Human readable, multi-line output for local runs.
    Pretty,
    /// One JSON object per event, for log shippers.
    Json,
}

/// Installs the global tracing subscriber exactly once.
///
/// `RUST_LOG` always wins; otherwise `default_level` is used
/// (`"info"` in quiet mode, `"debug"` when the bot runs in debug mode).
pub fn init_logger(service_name: &'static str, format: LogFormat, default_level: &str) {
    LOGGER_INIT.get_or_init(|| {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

        let base = fmt::layer()
            .with_target(true) // <-- shows crate/module path
            .with_thread_ids(true)
            .with_line_number(true)
            .with_span_events(fmt::format::FmtSpan::CLOSE);

        match format {
            LogFormat::Json => tracing_subscriber::registry()
                .with(filter)
                .with(base.json())
                .init(),
            LogFormat::Pretty => tracing_subscriber::registry()
                .with(filter)
                .with(base.pretty())
                .init(),
        }

        tracing::info!(service = service_name, ?format, "logger initialized");
    });
}

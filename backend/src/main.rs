use std::path::PathBuf;
use std::time::Duration;

use adapters::binance::BinanceRestClient;
use backend::{
    AlertBuilder, AppConfig, SignalRunner,
    feed::{build_feed, choose_feed, seed},
    health::check_all,
    runner::RunnerSettings,
    wiring::{build_notifiers, build_venues},
};
use clap::Parser;
use common::logger::{LogFormat, init_logger};
use corelib::PriceTick;
use engine::{SignalPipeline, SystemClock};
use tokio::sync::mpsc;

const SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

#[derive(Parser, Debug)]
#[command(name = "spreadwatch", about = "BTC/ETH 24h spread alerts")]
struct Cli {
    /// Path to the YAML configuration. Missing file means defaults.
    #[arg(long, default_value = "config.yaml")]
    config: PathBuf,

    /// Log every sample instead of a periodic heartbeat.
    #[arg(long)]
    debug: bool,

    /// Validate configuration, probe every endpoint, then exit.
    #[arg(long)]
    check: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    dotenv::dotenv().ok();

    let loaded = AppConfig::load(&cli.config);
    let debug_mode = cli.debug
        || loaded
            .as_ref()
            .map(|c| c.strategy.debug_mode)
            .unwrap_or(false);

    let is_production = std::env::var("APP_ENV").unwrap_or_default() == "production";
    let format = if is_production {
        LogFormat::Json
    } else {
        LogFormat::Pretty
    };
    init_logger("spreadwatch", format, if debug_mode { "debug" } else { "info" });

    let mut cfg = match loaded {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::error!(error = %e, path = %cli.config.display(), "cannot load configuration");
            std::process::exit(1);
        }
    };
    cfg.strategy.debug_mode = debug_mode;

    if let Err(e) = cfg.validate() {
        for msg in e.messages() {
            tracing::error!(problem = %msg, "invalid configuration");
        }
        std::process::exit(1);
    }

    tracing::info!(
        threshold = %cfg.strategy.params.spread_threshold,
        close_threshold = %cfg.strategy.params.spread_close_threshold,
        max = %cfg.strategy.params.spread_max,
        cooldown_sec = cfg.strategy.params.cooldown_sec,
        venues = ?cfg.venues(),
        "starting spreadwatch"
    );

    let venues = build_venues(&cfg)?;
    let notifiers = build_notifiers(&cfg)?;

    let health = check_all(&venues, &notifiers).await;
    if cli.check {
        tracing::info!(healthy = health.all_healthy(), "check finished");
        return Ok(());
    }

    let probe = BinanceRestClient::new(cfg.platforms.binance.rest_url.clone())?;
    let choice = choose_feed(&probe).await;
    let feed = build_feed(&choice, &cfg)?;

    let (tick_tx, tick_rx) = mpsc::channel::<PriceTick>(cfg.runtime.tick_channel_capacity);
    seed(&choice, &tick_tx).await;

    let feed_task = tokio::spawn(async move {
        if let Err(e) = feed.stream(tick_tx).await {
            tracing::error!(error = ?e, "price feed stopped");
        }
    });

    let pipeline = SignalPipeline::from_config(cfg.strategy.params.clone())?;
    let builder = AlertBuilder::new(venues, cfg.venue_timeout());
    let runner = SignalRunner::new(
        pipeline,
        builder,
        notifiers,
        SystemClock,
        RunnerSettings {
            debug_mode,
            heartbeat: Duration::from_secs(cfg.runtime.heartbeat_sec),
            feed: choice.name().to_string(),
        },
    );
    let status = runner.subscribe_status();

    tokio::select! {
        final_status = runner.run(tick_rx) => {
            tracing::warn!(status = ?final_status, "runner exited: price feed closed");
        }
        res = tokio::signal::ctrl_c() => {
            res?;
            tracing::info!("Shutdown signal received");
        }
    }

    feed_task.abort();

    let last = status.borrow().clone();
    match serde_json::to_string(&last) {
        Ok(json) => tracing::info!(status = %json, "final status"),
        Err(e) => tracing::warn!(error = %e, "cannot serialize final status"),
    }

    // Let in-flight dispatch tasks finish.
    tokio::time::sleep(SHUTDOWN_GRACE).await;
    Ok(())
}

//! CoinGecko fallback poller
//!
//! Polls a [`PairSnapshot`] on a fixed cadence and forwards both ticks into
//! the tick channel. Used when Binance is unreachable at startup.

use std::time::Duration;

use async_trait::async_trait;
use corelib::PriceTick;
use tokio::sync::mpsc::Sender;
use tokio::time::{Instant, MissedTickBehavior, interval};
use tracing::{error, info, instrument, warn};

use super::client::CoinGeckoClient;
use crate::feed::{FeedError, PairSnapshot, PriceFeed};

pub struct CoinGeckoPoller<S = CoinGeckoClient> {
    source: S,
    every: Duration,
    rate_limit_cooldown: Duration,
}

impl<S: PairSnapshot> CoinGeckoPoller<S> {
    pub fn new(source: S, every: Duration) -> Self {
        Self {
            source,
            every,
            rate_limit_cooldown: Duration::from_secs(60),
        }
    }

    pub fn with_rate_limit_cooldown(mut self, cooldown: Duration) -> Self {
        self.rate_limit_cooldown = cooldown;
        self
    }
}

#[async_trait]
impl<S: PairSnapshot> PriceFeed for CoinGeckoPoller<S> {
    fn name(&self) -> &'static str {
        super::SOURCE
    }

    #[instrument(skip_all, fields(every_sec = self.every.as_secs()))]
    async fn stream(&self, sender: Sender<PriceTick>) -> anyhow::Result<()> {
        let mut ticker = interval(self.every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let mut rate_limited_until: Option<Instant> = None;
        let mut fetches: u64 = 0;
        let mut rate_limits: u64 = 0;

        info!("coingecko poller started");

        loop {
            ticker.tick().await;

            if sender.is_closed() {
                info!("tick receiver dropped; stopping coingecko poller");
                return Ok(());
            }

            if let Some(until) = rate_limited_until {
                let now = Instant::now();
                if now < until {
                    warn!(
                        remaining_sec = (until - now).as_secs(),
                        "rate limited; waiting"
                    );
                    continue;
                }
                rate_limited_until = None;
                info!("rate limit cleared; resuming");
            }

            fetches += 1;

            match self.source.fetch_pair().await {
                Ok((btc, eth)) => {
                    for tick in [btc, eth] {
                        if sender.send(tick).await.is_err() {
                            return Ok(());
                        }
                    }
                }
                Err(FeedError::RateLimited(_)) => {
                    rate_limits += 1;
                    rate_limited_until = Some(Instant::now() + self.rate_limit_cooldown);
                    error!(
                        cooldown_sec = self.rate_limit_cooldown.as_secs(),
                        total_rate_limits = rate_limits,
                        total_fetches = fetches,
                        "rate limited by coingecko; consider raising polling_interval_sec"
                    );
                }
                Err(e) => warn!(error = %e, "coingecko poll failed"),
            }
        }
    }
}

//! Price feed selection.
//!
//! Binance is preferred. A REST snapshot at startup both proves it is
//! reachable and seeds the monitor so the first spread is available before
//! the WebSocket delivers anything. If the snapshot fails the bot runs on
//! the CoinGecko poller instead.

use adapters::binance::BinanceWsFeed;
use adapters::coingecko::{CoinGeckoClient, CoinGeckoPoller};
use adapters::{FeedError, PairSnapshot, PriceFeed};
use corelib::PriceTick;
use tokio::sync::mpsc::Sender;
use tracing::{info, warn};

use crate::config::AppConfig;

#[derive(Debug, Clone, PartialEq)]
pub enum FeedChoice {
    /// Binance answered; the snapshot ticks seed the monitor.
    Binance { seed: (PriceTick, PriceTick) },
    CoinGecko,
}

impl FeedChoice {
    pub fn name(&self) -> &'static str {
        match self {
            FeedChoice::Binance { .. } => "binance",
            FeedChoice::CoinGecko => "coingecko",
        }
    }
}

pub async fn choose_feed(probe: &dyn PairSnapshot) -> FeedChoice {
    match probe.fetch_pair().await {
        Ok((btc, eth)) => {
            info!(btc = %btc.price, eth = %eth.price, "binance snapshot ok; using websocket feed");
            FeedChoice::Binance { seed: (btc, eth) }
        }
        Err(e) => {
            warn!(error = %e, "binance snapshot failed; falling back to coingecko polling");
            FeedChoice::CoinGecko
        }
    }
}

pub fn build_feed(choice: &FeedChoice, cfg: &AppConfig) -> Result<Box<dyn PriceFeed>, FeedError> {
    Ok(match choice {
        FeedChoice::Binance { .. } => {
            Box::new(BinanceWsFeed::new(cfg.platforms.binance.ws_url.clone()))
        }
        FeedChoice::CoinGecko => {
            let client = CoinGeckoClient::new(cfg.platforms.coingecko.rest_url.clone())?;
            Box::new(CoinGeckoPoller::new(client, cfg.polling_interval()))
        }
    })
}

/// Push the snapshot ticks (if any) ahead of the live feed.
pub async fn seed(choice: &FeedChoice, sender: &Sender<PriceTick>) {
    if let FeedChoice::Binance { seed: (btc, eth) } = choice {
        for tick in [btc.clone(), eth.clone()] {
            if sender.send(tick).await.is_err() {
                return;
            }
        }
    }
}

use async_trait::async_trait;
use corelib::{Asset, PriceTick};
use thiserror::Error;
use tokio::sync::mpsc::Sender;

/// A source of signal-driving price ticks.
///
/// Implementations push every tick they observe into `sender` and keep
/// going until the receiving side is dropped.
#[async_trait]
pub trait PriceFeed: Send + Sync {
    fn name(&self) -> &'static str;

    async fn stream(&self, sender: Sender<PriceTick>) -> anyhow::Result<()>;
}

/// One-shot (BTC, ETH) price fetch. Backs the REST snapshot and the
/// polling fallback.
#[async_trait]
pub trait PairSnapshot: Send + Sync {
    async fn fetch_pair(&self) -> Result<(PriceTick, PriceTick), FeedError>;
}

#[derive(Error, Debug)]
pub enum FeedError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("rate limited by {0}")]
    RateLimited(&'static str),

    #[error("no data for {0}")]
    MissingAsset(Asset),

    #[error("cannot parse field `{field}`: {value}")]
    Parse { field: &'static str, value: String },
}

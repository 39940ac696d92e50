use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use corelib::PriceTick;
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc::Sender;
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{debug, error, info, instrument, trace, warn};

use super::parser::{BinanceMessage, parse_ticker_message, subscribe_message};
use crate::feed::PriceFeed;

/// Reconnect delay that doubles after every failed session, capped at `max`.
#[derive(Debug, Clone)]
pub struct Backoff {
    initial: Duration,
    max: Duration,
    current: Duration,
}

impl Backoff {
    pub fn new(initial: Duration, max: Duration) -> Self {
        Self {
            initial,
            max,
            current: initial,
        }
    }

    /// Delay to wait now; the following call returns the doubled value.
    pub fn next_delay(&mut self) -> Duration {
        let delay = self.current;
        self.current = (self.current * 2).min(self.max);
        delay
    }

    pub fn reset(&mut self) {
        self.current = self.initial;
    }
}

/// Binance 24h ticker WebSocket stream for BTCUSDT and ETHUSDT.
pub struct BinanceWsFeed {
    pub ws_url: String,
    initial_backoff: Duration,
    max_backoff: Duration,
}

enum SessionEnd {
    Disconnected,
    ReceiverDropped,
}

impl BinanceWsFeed {
    pub fn new(ws_url: String) -> Self {
        Self {
            ws_url,
            initial_backoff: Duration::from_secs(5),
            max_backoff: Duration::from_secs(60),
        }
    }

    pub fn with_backoff(mut self, initial: Duration, max: Duration) -> Self {
        self.initial_backoff = initial;
        self.max_backoff = max;
        self
    }

    /// One connection lifetime: subscribe, then forward ticks until the
    /// socket dies or nobody is listening any more.
    async fn run_session(
        &self,
        sender: &Sender<PriceTick>,
        backoff: &mut Backoff,
    ) -> anyhow::Result<SessionEnd> {
        let (ws, _) = connect_async(&self.ws_url).await?;
        info!("binance websocket connected");
        backoff.reset();

        let (mut write, mut read) = ws.split();

        let sub = serde_json::to_string(&subscribe_message())?;
        write.send(Message::Text(sub.into())).await?;
        debug!("ticker subscription sent");

        while let Some(msg) = read.next().await {
            let msg = match msg {
                Ok(m) => m,
                Err(e) => {
                    warn!(error = ?e, "websocket stream error");
                    return Ok(SessionEnd::Disconnected);
                }
            };

            if msg.is_close() {
                info!(frame = ?msg, "websocket closed by server");
                return Ok(SessionEnd::Disconnected);
            }

            if !msg.is_text() {
                continue;
            }

            let raw = match msg.to_text() {
                Ok(t) => t,
                Err(e) => {
                    error!(error = ?e, "failed to extract text from ws message");
                    continue;
                }
            };

            trace!(raw_event = %raw, "raw ticker message");

            match parse_ticker_message(raw, Utc::now()) {
                Ok(BinanceMessage::Ticker(tick)) => {
                    if sender.send(tick).await.is_err() {
                        return Ok(SessionEnd::ReceiverDropped);
                    }
                }
                Ok(BinanceMessage::Ack) => debug!("subscription acknowledged"),
                Ok(BinanceMessage::Ignored) => {}
                Err(e) => warn!(error = %e, "invalid message from websocket"),
            }
        }

        Ok(SessionEnd::Disconnected)
    }
}

#[async_trait]
impl PriceFeed for BinanceWsFeed {
    fn name(&self) -> &'static str {
        super::SOURCE
    }

    #[instrument(skip(self, sender), fields(url = %self.ws_url))]
    async fn stream(&self, sender: Sender<PriceTick>) -> anyhow::Result<()> {
        info!("starting binance ticker stream");
        let mut backoff = Backoff::new(self.initial_backoff, self.max_backoff);

        loop {
            match self.run_session(&sender, &mut backoff).await {
                Ok(SessionEnd::ReceiverDropped) => {
                    info!("tick receiver dropped; stopping binance stream");
                    return Ok(());
                }
                Ok(SessionEnd::Disconnected) => {}
                Err(e) => error!(error = ?e, "websocket session failed"),
            }

            if sender.is_closed() {
                return Ok(());
            }

            let delay = backoff.next_delay();
            warn!(delay_sec = delay.as_secs(), "disconnected; reconnecting");
            tokio::time::sleep(delay).await;
        }
    }
}

use std::time::Duration;

use async_trait::async_trait;
use corelib::{AlertKind, AlertPayload, Direction, EnrichmentSnapshot, VenueBlock};
use reqwest::{Client, StatusCode};
use rust_decimal::Decimal;
use serde_json::{Value, json};
use tracing::{info, instrument, warn};

use super::format::{duration, pct, pct_signed, source_label, truncate, usd, usd_signed};
use super::{Notifier, NotifyError};

const RULE: &str = "━━━━━━━━━━━━━━━━━━━━━";
const FOOTER: &str = "_NFA. DYOR 🙏_";
const API_ROOT: &str = "https://api.telegram.org";

/// Telegram Bot API `sendMessage` channel.
pub struct TelegramNotifier {
    http: Client,
    api_url: String,
    chat_id: String,
}

impl TelegramNotifier {
    pub fn new(bot_token: &str, chat_id: String) -> Result<Self, NotifyError> {
        Self::with_api_root(API_ROOT, bot_token, chat_id)
    }

    /// Same as [`TelegramNotifier::new`] against a different Bot API host.
    pub fn with_api_root(
        api_root: &str,
        bot_token: &str,
        chat_id: String,
    ) -> Result<Self, NotifyError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            http,
            api_url: format!("{}/bot{bot_token}", api_root.trim_end_matches('/')),
            chat_id,
        })
    }

    pub fn request_body(&self, payload: &AlertPayload) -> Value {
        json!({
            "chat_id": self.chat_id,
            "text": render(payload),
            "parse_mode": "Markdown",
            "disable_web_page_preview": true,
        })
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    fn name(&self) -> &'static str {
        "telegram"
    }

    #[instrument(skip_all, fields(trace_id = %payload.trace_id, kind = payload.kind.label()))]
    async fn send(&self, payload: &AlertPayload) -> Result<(), NotifyError> {
        let resp = self
            .http
            .post(format!("{}/sendMessage", self.api_url))
            .json(&self.request_body(payload))
            .send()
            .await?;

        let status = resp.status();
        if status != StatusCode::OK {
            let body = resp.text().await.unwrap_or_default();
            return Err(NotifyError::Rejected {
                channel: "telegram",
                status: status.as_u16(),
                body: truncate(&body, 200),
            });
        }

        info!("telegram notification sent");
        Ok(())
    }

    async fn health_check(&self) -> bool {
        let resp = match self.http.get(format!("{}/getMe", self.api_url)).send().await {
            Ok(r) => r,
            Err(e) => {
                warn!(error = %e.without_url(), "telegram health check failed");
                return false;
            }
        };

        if !resp.status().is_success() {
            return false;
        }

        match resp.json::<Value>().await {
            Ok(body) if body["ok"].as_bool() == Some(true) => {
                info!(
                    username = body["result"]["username"].as_str().unwrap_or_default(),
                    "telegram bot connected"
                );
                true
            }
            _ => false,
        }
    }
}

/// Markdown message for one alert.
pub fn render(payload: &AlertPayload) -> String {
    let mut lines: Vec<String> = vec!["🧘 *MONK MODE ALERT*".into(), String::new(), RULE.into()];

    match &payload.kind {
        AlertKind::Entry { direction } => {
            let emoji = match direction {
                Direction::LongBtcShortEth => "📈",
                Direction::ShortBtcLongEth => "📉",
            };
            lines.push(format!(
                "{emoji} *{} SIGNAL*",
                direction.strategy_label().to_uppercase()
            ));
            lines.push(RULE.into());
            lines.push(String::new());
            lines.push(format!("*Action:* {}", direction.action_text()));
            lines.push(format!("*Reason:* {}", payload.reason));
            lines.push(String::new());
            lines.push(format!(
                "📊 *{} (Signal Source)*",
                source_label(&payload.btc.source)
            ));
            lines.push(format!(
                "├─ BTC: {} ({})",
                usd(payload.btc.price),
                pct_signed(payload.btc.pct_change_24h)
            ));
            lines.push(format!(
                "├─ ETH: {} ({})",
                usd(payload.eth.price),
                pct_signed(payload.eth.pct_change_24h)
            ));
            lines.push(format!("└─ Spread: {}", pct_signed(payload.spread_pct)));
        }
        AlertKind::Close {
            direction,
            entry_spread_pct,
            current_spread_pct,
            duration: held,
            estimated_pnl_usd,
            ..
        } => {
            let pnl_emoji = if *estimated_pnl_usd > Decimal::ZERO { "🟢" } else { "🔴" };
            lines.push("💰 *CLOSE POSITION SIGNAL*".into());
            lines.push(RULE.into());
            lines.push(String::new());
            lines.push("*Action:* Close All Positions".into());
            lines.push(format!("*Reason:* {}", payload.reason));
            lines.push(String::new());
            lines.push("📊 *Position Summary*".into());
            lines.push(format!(
                "├─ Entry: {} ({})",
                direction.strategy_label(),
                direction.action_text()
            ));
            lines.push(format!("├─ Entry Spread: {}", pct_signed(*entry_spread_pct)));
            lines.push(format!(
                "├─ Current Spread: {}",
                pct_signed(*current_spread_pct)
            ));
            lines.push(format!("├─ Duration: {}", duration(*held)));
            lines.push(format!(
                "└─ Est. PnL: {pnl_emoji} {}",
                usd_signed(*estimated_pnl_usd)
            ));
            lines.push(String::new());
            lines.push("📊 *Current Prices*".into());
            lines.push(format!("├─ BTC: {}", usd(payload.btc.price)));
            lines.push(format!("└─ ETH: {}", usd(payload.eth.price)));
        }
    }

    for block in payload.venues.iter().filter(|b| !b.is_empty()) {
        lines.push(String::new());
        lines.extend(venue_lines(block));
    }

    lines.push(String::new());
    lines.push(format!(
        "⏰ {} UTC",
        payload.generated_at.format("%Y-%m-%d %H:%M:%S")
    ));
    lines.push(String::new());
    lines.push(FOOTER.into());

    lines.join("\n")
}

fn venue_lines(block: &VenueBlock) -> Vec<String> {
    let mut lines = vec![format!(
        "💹 *{}*",
        block.venue.display_name().to_uppercase()
    )];

    let snaps: Vec<&EnrichmentSnapshot> = [&block.btc, &block.eth]
        .into_iter()
        .flatten()
        .collect();

    for (i, snap) in snaps.iter().enumerate() {
        let branch = if i + 1 == snaps.len() { "└─" } else { "├─" };
        let mut line = format!("{branch} {}: {}", snap.asset, usd(snap.mark_price));
        if let (Some(bid), Some(ask)) = (snap.bid, snap.ask) {
            line.push_str(&format!(" (B/A: {}/{})", usd(bid), usd(ask)));
        }
        if let Some(fr) = snap.funding_rate_pct {
            line.push_str(&format!(" | FR: {}", pct(fr, 4)));
        }
        lines.push(line);
    }

    lines
}

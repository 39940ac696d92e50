use std::time::Duration;

use async_trait::async_trait;
use corelib::{AlertKind, AlertPayload, Direction};
use reqwest::{Client, StatusCode};
use serde_json::{Value, json};
use tracing::{info, instrument, warn};

use super::format::{duration, pct, pct_signed, truncate, usd, usd_signed, usd_whole};
use super::{Notifier, NotifyError};

pub const COLOR_STRATEGY_1: u32 = 0x00FF88;
pub const COLOR_STRATEGY_2: u32 = 0xFF3366;
pub const COLOR_CLOSE: u32 = 0xF7931A;

const USERNAME: &str = "Monk Mode";
const AVATAR_URL: &str =
    "https://em-content.zobj.net/source/apple/391/person-in-lotus-position_1f9d8.png";
const FOOTER: &str = "Monk Mode Bot • NFA DYOR";

/// Discord webhook channel.
pub struct DiscordNotifier {
    http: Client,
    webhook_url: String,
    role_id: Option<String>,
}

impl DiscordNotifier {
    pub fn new(webhook_url: String, role_id: Option<String>) -> Result<Self, NotifyError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            http,
            webhook_url,
            role_id: role_id.filter(|r| !r.trim().is_empty()),
        })
    }

    /// Webhook body: one embed, plus a role mention when configured.
    pub fn request_body(&self, payload: &AlertPayload) -> Value {
        let mut body = json!({
            "username": USERNAME,
            "avatar_url": AVATAR_URL,
            "embeds": [render_embed(payload)],
        });

        if let Some(role) = &self.role_id {
            body["content"] = json!(format!("<@&{role}>"));
            body["allowed_mentions"] = json!({ "roles": [role] });
        }

        body
    }
}

#[async_trait]
impl Notifier for DiscordNotifier {
    fn name(&self) -> &'static str {
        "discord"
    }

    #[instrument(skip_all, fields(trace_id = %payload.trace_id, kind = payload.kind.label()))]
    async fn send(&self, payload: &AlertPayload) -> Result<(), NotifyError> {
        let resp = self
            .http
            .post(&self.webhook_url)
            .json(&self.request_body(payload))
            .send()
            .await?;

        // 204 No Content is the normal webhook reply
        let status = resp.status();
        if status != StatusCode::OK && status != StatusCode::NO_CONTENT {
            let body = resp.text().await.unwrap_or_default();
            return Err(NotifyError::Rejected {
                channel: "discord",
                status: status.as_u16(),
                body: truncate(&body, 200),
            });
        }

        info!("discord notification sent");
        Ok(())
    }

    async fn health_check(&self) -> bool {
        match self.http.get(&self.webhook_url).send().await {
            Ok(resp) if resp.status() == StatusCode::OK => {
                let body: Value = resp.json().await.unwrap_or_default();
                info!(
                    name = body["name"].as_str().unwrap_or_default(),
                    channel = body["channel_id"].as_str().unwrap_or_default(),
                    "discord webhook connected"
                );
                true
            }
            Ok(resp) => {
                warn!(status = resp.status().as_u16(), "discord webhook check rejected");
                false
            }
            Err(e) => {
                warn!(error = %e.without_url(), "discord health check failed");
                false
            }
        }
    }
}

fn field(name: impl Into<String>, value: impl Into<String>, inline: bool) -> Value {
    json!({ "name": name.into(), "value": value.into(), "inline": inline })
}

fn venue_fields(payload: &AlertPayload) -> Vec<Value> {
    payload
        .venues
        .iter()
        .filter(|b| !b.is_empty())
        .map(|block| {
            let lines: Vec<String> = [&block.btc, &block.eth]
                .into_iter()
                .flatten()
                .map(|snap| {
                    let mut line = format!("{}: {}", snap.asset, usd(snap.mark_price));
                    if let Some(fr) = snap.funding_rate_pct {
                        line.push_str(&format!(" (FR: {})", pct(fr, 3)));
                    }
                    line
                })
                .collect();

            field(
                format!("💹 {}", block.venue.display_name()),
                lines.join("\n"),
                true,
            )
        })
        .collect()
}

/// Embed object for one alert.
pub fn render_embed(payload: &AlertPayload) -> Value {
    let timestamp = payload.generated_at.to_rfc3339();

    match &payload.kind {
        AlertKind::Entry { direction } => {
            let (color, title) = match direction {
                Direction::LongBtcShortEth => (COLOR_STRATEGY_1, "📈 Strategy 1 Signal"),
                Direction::ShortBtcLongEth => (COLOR_STRATEGY_2, "📉 Strategy 2 Signal"),
            };

            let mut fields = vec![
                field(
                    "🟠 BTC",
                    format!(
                        "{}\n{} (24h)",
                        usd(payload.btc.price),
                        pct_signed(payload.btc.pct_change_24h)
                    ),
                    true,
                ),
                field(
                    "🔷 ETH",
                    format!(
                        "{}\n{} (24h)",
                        usd(payload.eth.price),
                        pct_signed(payload.eth.pct_change_24h)
                    ),
                    true,
                ),
                field("📊 Spread", pct_signed(payload.spread_pct), true),
            ];
            fields.extend(venue_fields(payload));

            json!({
                "title": title,
                "description": format!("**{}**\n{}", direction.action_text(), payload.reason),
                "color": color,
                "fields": fields,
                "footer": { "text": FOOTER },
                "timestamp": timestamp,
            })
        }
        AlertKind::Close {
            direction,
            entry_spread_pct,
            current_spread_pct,
            duration: held,
            estimated_pnl_usd,
            position_size_usd,
            entry_btc_price,
            entry_eth_price,
        } => {
            let mut fields = vec![
                field("📊 Current Spread", pct_signed(*current_spread_pct), true),
                field("📈 Entry Spread", pct_signed(*entry_spread_pct), true),
                field("💵 Est. PnL", usd_signed(*estimated_pnl_usd), true),
                field(
                    "📝 Position Summary",
                    format!(
                        "Entry: {} ({})\nBTC @ {} / ETH @ {}\nDuration: {} • Size: {}/leg",
                        direction.strategy_label(),
                        direction.action_text(),
                        usd(*entry_btc_price),
                        usd(*entry_eth_price),
                        duration(*held),
                        usd_whole(*position_size_usd),
                    ),
                    false,
                ),
            ];
            fields.extend(venue_fields(payload));

            json!({
                "title": "💰 Close Position Signal",
                "description": format!(
                    "**Spread Normalized - Take Profit**\nSpread returned to: **{}**",
                    pct_signed(*current_spread_pct)
                ),
                "color": COLOR_CLOSE,
                "fields": fields,
                "footer": { "text": FOOTER },
                "timestamp": timestamp,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notifiers::fixtures;

    #[tokio::test]
    async fn test_transport_error_hides_webhook_url() {
        let notifier = DiscordNotifier::new(
            "http://127.0.0.1:9/api/webhooks/42/SECRET-HOOK-XYZ".into(),
            None,
        )
        .unwrap();

        let err = notifier.send(&fixtures::close()).await.unwrap_err();

        assert!(matches!(err, NotifyError::Http(_)));
        assert!(!err.to_string().contains("SECRET-HOOK-XYZ"));
        assert!(!format!("{err:?}").contains("SECRET-HOOK-XYZ"));
    }

    #[test]
    fn test_entry_embed_colors() {
        let s1 = render_embed(&fixtures::entry(Direction::LongBtcShortEth));
        let s2 = render_embed(&fixtures::entry(Direction::ShortBtcLongEth));

        assert_eq!(s1["color"], COLOR_STRATEGY_1);
        assert_eq!(s1["title"], "📈 Strategy 1 Signal");
        assert_eq!(s2["color"], COLOR_STRATEGY_2);
        assert_eq!(s2["title"], "📉 Strategy 2 Signal");
    }

    #[test]
    fn test_entry_embed_fields() {
        let embed = render_embed(&fixtures::entry(Direction::LongBtcShortEth));

        assert_eq!(
            embed["description"],
            "**Long BTC / Short ETH**\nETH outperforming BTC by 2.53%"
        );
        assert_eq!(embed["fields"][0]["value"], "$97,250.50\n+2.34% (24h)");
        assert_eq!(embed["fields"][2]["value"], "+2.53%");
        assert_eq!(embed["fields"][3]["name"], "💹 Variational");
        assert_eq!(
            embed["fields"][3]["value"],
            "BTC: $97,180.12 (FR: 0.010%)\nETH: $3,410.50 (FR: 0.010%)"
        );
        assert_eq!(embed["fields"][4]["value"], "ETH: $3,410.50");
        assert_eq!(embed["footer"]["text"], "Monk Mode Bot • NFA DYOR");
        assert_eq!(embed["timestamp"], "2025-03-01T14:15:00+00:00");
    }

    #[test]
    fn test_close_embed() {
        let embed = render_embed(&fixtures::close());

        assert_eq!(embed["color"], COLOR_CLOSE);
        assert_eq!(embed["fields"][0]["value"], "+0.82%");
        assert_eq!(embed["fields"][1]["value"], "+2.53%");
        assert_eq!(embed["fields"][2]["value"], "+$17.10");
        assert_eq!(
            embed["fields"][3]["value"],
            "Entry: Strategy 1 (Long BTC / Short ETH)\nBTC @ $96,100.00 / ETH @ $3,390.40\nDuration: 2h 15m • Size: $1,000/leg"
        );
    }

    #[test]
    fn test_role_mention() {
        let n = DiscordNotifier::new("https://discord.test/api/webhooks/1/x".into(), Some("42".into()))
            .unwrap();
        let body = n.request_body(&fixtures::close());

        assert_eq!(body["content"], "<@&42>");
        assert_eq!(body["allowed_mentions"]["roles"][0], "42");
        assert_eq!(body["username"], "Monk Mode");
        assert_eq!(body["embeds"].as_array().map(Vec::len), Some(1));
    }

    #[test]
    fn test_blank_role_is_ignored() {
        let n = DiscordNotifier::new("https://discord.test/api/webhooks/1/x".into(), Some(" ".into()))
            .unwrap();
        let body = n.request_body(&fixtures::entry(Direction::LongBtcShortEth));

        assert!(body.get("content").is_none());
    }
}

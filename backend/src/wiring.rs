//! Builds the concrete adapters named by [`AppConfig`].

use std::sync::Arc;

use adapters::notifiers::{DiscordNotifier, TelegramNotifier};
use adapters::venues::{ExtendedClient, VariationalClient};
use adapters::{EnrichmentSource, Notifier};
use anyhow::Context;
use corelib::VenueId;

use crate::config::AppConfig;

/// Enrichment clients, in configured order.
pub fn build_venues(cfg: &AppConfig) -> anyhow::Result<Vec<Arc<dyn EnrichmentSource>>> {
    cfg.venues()
        .into_iter()
        .map(|venue| -> anyhow::Result<Arc<dyn EnrichmentSource>> {
            Ok(match venue {
                VenueId::Variational => Arc::new(
                    VariationalClient::new(cfg.platforms.variational.rest_url.clone())
                        .context("variational client")?,
                ),
                VenueId::Extended => Arc::new(
                    ExtendedClient::new(cfg.platforms.extended.rest_url.clone())
                        .context("extended client")?,
                ),
            })
        })
        .collect()
}

/// Enabled notifiers. Expects a validated config.
pub fn build_notifiers(cfg: &AppConfig) -> anyhow::Result<Vec<Arc<dyn Notifier>>> {
    let mut out: Vec<Arc<dyn Notifier>> = Vec::new();
    let secrets = &cfg.secrets;

    if cfg.notifications.telegram.enabled {
        let (Some(token), Some(chat_id)) = (&secrets.telegram_bot_token, &secrets.telegram_chat_id)
        else {
            anyhow::bail!("telegram enabled without credentials");
        };
        out.push(Arc::new(
            TelegramNotifier::new(token, chat_id.clone()).context("telegram notifier")?,
        ));
    }

    if cfg.notifications.discord.enabled {
        let Some(webhook) = &secrets.discord_webhook_url else {
            anyhow::bail!("discord enabled without webhook url");
        };
        out.push(Arc::new(
            DiscordNotifier::new(webhook.clone(), cfg.notifications.discord.role_id.clone())
                .context("discord notifier")?,
        ));
    }

    Ok(out)
}

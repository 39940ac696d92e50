//! Application configuration.
//!
//! Loaded from an optional YAML file, then overlaid with environment
//! variables (`.env` is read by the binary before this runs). Secrets only
//! ever come from the environment.

use std::path::Path;
use std::time::Duration;

use corelib::VenueId;
use engine::StrategyConfig;
use serde::{Deserialize, Deserializer};
use tracing::info;

use crate::error::ConfigError;

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct StrategySection {
    #[serde(flatten)]
    pub params: StrategyConfig,

    /// Log every accepted sample instead of a periodic heartbeat.
    pub debug_mode: bool,

    /// CoinGecko fallback cadence.
    pub polling_interval_sec: u64,
}

impl Default for StrategySection {
    fn default() -> Self {
        Self {
            params: StrategyConfig::default(),
            debug_mode: false,
            polling_interval_sec: 30,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct TelegramSection {
    pub enabled: bool,
}

impl Default for TelegramSection {
    fn default() -> Self {
        Self { enabled: true }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct DiscordSection {
    pub enabled: bool,

    /// Role tagged on every alert. YAML may carry it as a number.
    #[serde(deserialize_with = "string_or_number")]
    pub role_id: Option<String>,
}

impl Default for DiscordSection {
    fn default() -> Self {
        Self {
            enabled: true,
            role_id: None,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct NotificationsSection {
    pub telegram: TelegramSection,
    pub discord: DiscordSection,
    pub include_platforms: Vec<String>,
}

impl Default for NotificationsSection {
    fn default() -> Self {
        Self {
            telegram: TelegramSection::default(),
            discord: DiscordSection::default(),
            include_platforms: vec!["variational".into(), "extended".into()],
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct BinanceUrls {
    pub ws_url: String,
    pub rest_url: String,
}

impl Default for BinanceUrls {
    fn default() -> Self {
        Self {
            ws_url: "wss://stream.binance.com:9443/ws".into(),
            rest_url: "https://api.binance.com/api/v3".into(),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct RestUrl {
    pub rest_url: String,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct PlatformsSection {
    pub binance: BinanceUrls,
    pub coingecko: RestUrl,
    pub variational: RestUrl,
    pub extended: RestUrl,
}

impl Default for PlatformsSection {
    fn default() -> Self {
        Self {
            binance: BinanceUrls::default(),
            coingecko: RestUrl {
                rest_url: "https://api.coingecko.com/api/v3".into(),
            },
            variational: RestUrl {
                rest_url: "https://omni-client-api.prod.ap-northeast-1.variational.io".into(),
            },
            extended: RestUrl {
                rest_url: "https://api.extended.exchange/api/v1".into(),
            },
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct RuntimeSection {
    /// Upper bound for one venue's enrichment fetch.
    pub venue_timeout_ms: u64,

    /// Capacity of the feed -> runner tick channel.
    pub tick_channel_capacity: usize,

    /// Quiet-mode heartbeat period.
    pub heartbeat_sec: u64,
}

impl Default for RuntimeSection {
    fn default() -> Self {
        Self {
            venue_timeout_ms: 5_000,
            tick_channel_capacity: 1_024,
            heartbeat_sec: 60,
        }
    }
}

/// Secrets from the environment. Never read from YAML.
#[derive(Clone, Default)]
pub struct Secrets {
    pub telegram_bot_token: Option<String>,
    pub telegram_chat_id: Option<String>,
    pub discord_webhook_url: Option<String>,
}

impl std::fmt::Debug for Secrets {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let shown = |v: &Option<String>| if v.is_some() { "<set>" } else { "<unset>" };
        f.debug_struct("Secrets")
            .field("telegram_bot_token", &shown(&self.telegram_bot_token))
            .field("telegram_chat_id", &shown(&self.telegram_chat_id))
            .field("discord_webhook_url", &shown(&self.discord_webhook_url))
            .finish()
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub strategy: StrategySection,
    pub notifications: NotificationsSection,
    pub platforms: PlatformsSection,
    pub runtime: RuntimeSection,

    #[serde(skip)]
    pub secrets: Secrets,
}

fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Int(u64),
    }

    Ok(Option::<Raw>::deserialize(deserializer)?
        .map(|raw| match raw {
            Raw::Text(s) => s.trim().to_string(),
            Raw::Int(n) => n.to_string(),
        })
        .filter(|s| !s.is_empty()))
}

impl AppConfig {
    /// Read `path` if it exists (a missing file means all defaults), then
    /// apply process environment overrides.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let mut cfg = if path.exists() {
            let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            Self::from_yaml_str(&raw)?
        } else {
            info!(path = %path.display(), "config file not found; using defaults");
            Self::default()
        };

        cfg.apply_env(|key| std::env::var(key).ok());
        Ok(cfg)
    }

    pub fn from_yaml_str(raw: &str) -> Result<Self, ConfigError> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(raw)?)
    }

    /// Overlay secrets and URL overrides from `lookup` (normally the process
    /// environment). Empty values count as unset.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        self.secrets = Secrets {
            telegram_bot_token: get("TELEGRAM_BOT_TOKEN"),
            telegram_chat_id: get("TELEGRAM_CHAT_ID"),
            discord_webhook_url: get("DISCORD_WEBHOOK_URL"),
        };

        if let Some(v) = get("BINANCE_WS_URL") {
            self.platforms.binance.ws_url = v;
        }
        if let Some(v) = get("BINANCE_REST_URL") {
            self.platforms.binance.rest_url = v;
        }
        if let Some(v) = get("COINGECKO_URL") {
            self.platforms.coingecko.rest_url = v;
        }
        if let Some(v) = get("VARIATIONAL_URL") {
            self.platforms.variational.rest_url = v;
        }
        if let Some(v) = get("EXTENDED_URL") {
            self.platforms.extended.rest_url = v;
        }
    }

    /// Every problem at once, so the operator can fix them in one go.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors: Vec<String> = self
            .strategy
            .params
            .violations()
            .iter()
            .map(ToString::to_string)
            .collect();

        if self.strategy.polling_interval_sec == 0 {
            errors.push("polling_interval_sec must be positive".into());
        }

        if self.notifications.telegram.enabled {
            if self.secrets.telegram_bot_token.is_none() {
                errors.push("TELEGRAM_BOT_TOKEN is required when Telegram is enabled".into());
            }
            if self.secrets.telegram_chat_id.is_none() {
                errors.push("TELEGRAM_CHAT_ID is required when Telegram is enabled".into());
            }
        }

        if self.notifications.discord.enabled && self.secrets.discord_webhook_url.is_none() {
            errors.push("DISCORD_WEBHOOK_URL is required when Discord is enabled".into());
        }

        for name in &self.notifications.include_platforms {
            if let Err(e) = name.parse::<VenueId>() {
                errors.push(e.to_string());
            }
        }

        if self.runtime.venue_timeout_ms == 0 {
            errors.push("venue_timeout_ms must be positive".into());
        }
        if self.runtime.tick_channel_capacity == 0 {
            errors.push("tick_channel_capacity must be positive".into());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Invalid(errors))
        }
    }

    /// Configured venues in configuration order, duplicates and unknown
    /// names dropped.
    pub fn venues(&self) -> Vec<VenueId> {
        let mut out = Vec::new();
        for venue in self
            .notifications
            .include_platforms
            .iter()
            .filter_map(|n| n.parse::<VenueId>().ok())
        {
            if !out.contains(&venue) {
                out.push(venue);
            }
        }
        out
    }

    pub fn venue_timeout(&self) -> Duration {
        Duration::from_millis(self.runtime.venue_timeout_ms)
    }

    pub fn polling_interval(&self) -> Duration {
        Duration::from_secs(self.strategy.polling_interval_sec)
    }
}

pub mod discord;
pub mod errors;
pub mod format;
pub mod telegram;

use async_trait::async_trait;
use corelib::AlertPayload;

pub use discord::DiscordNotifier;
pub use errors::NotifyError;
pub use telegram::TelegramNotifier;

/// An outbound channel for alerts.
///
/// A failed `send` affects only this channel; callers log and move on.
#[async_trait]
pub trait Notifier: Send + Sync {
    fn name(&self) -> &'static str;

    async fn send(&self, payload: &AlertPayload) -> Result<(), NotifyError>;

    async fn health_check(&self) -> bool;
}

pub mod telegram;

pub use telegram::TelegramNotifier;

use crate::config::{AppConfig, NotifierSettings};
use crate::domain::ports::Notifier;

/// Telegram when both credentials are configured, otherwise nothing.
pub fn from_config(config: &AppConfig, settings: &NotifierSettings) -> Option<Box<dyn Notifier>> {
    match config.telegram_credentials() {
        Some((token, chat_id)) => Some(Box::new(TelegramNotifier::new(
            token,
            chat_id,
            settings.clone(),
        ))),
        None => {
            tracing::warn!("Telegram credentials not configured, notifications will be skipped");
            None
        }
    }
}

// notifier/telegram/sender.rs

use crate::model::NotifyError;
use crate::notifier::telegram::TelegramNotifier;
use tracing::{info, warn};

/// Subject on the first line, body after a blank line.
pub fn compose_message(subject: &str, body: &str) -> String {
    format!("{}\n\n{}", subject, body)
}

/// Sends a text message to the given chat via the Bot API.
pub async fn send_message(
    notifier: &TelegramNotifier,
    chat_id: &str,
    text: &str,
) -> Result<(), NotifyError> {
    let url = notifier.api_url("sendMessage");
    info!("Sending Telegram message to chat {}", chat_id);
    let response = notifier
        .client
        .post(&url)
        .form(&[("chat_id", chat_id), ("text", text)])
        .send()
        .await
        .map_err(|e| {
            // The request url carries the bot token.
            let e = e.without_url();
            if e.is_timeout() || e.is_connect() {
                warn!("Telegram unreachable: {}", e);
                NotifyError::Unreachable
            } else {
                warn!("Telegram send() failed: {}", e);
                NotifyError::ApiError(format!("Send failed: {}", e))
            }
        })?;
    let status = response.status();
    let body = response.text().await.unwrap_or_else(|_| "unknown".into());
    if !status.is_success() {
        warn!("Telegram API responded [{}]: {}", status, body);
        return Err(NotifyError::ApiError(format!("status {}: {}", status, body)));
    }
    info!("Telegram response [{}]", status);
    Ok(())
}

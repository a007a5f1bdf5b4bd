pub mod sender;

use crate::config::TelegramConfig;
use crate::model::NotifyError;
use crate::notifier::Notifier;
use reqwest::Client;
use std::time::Duration;

const API_BASE: &str = "https://api.telegram.org";

pub struct TelegramNotifier {
    pub bot_token: String,
    pub client: Client,
    api_base: String,
}

impl TelegramNotifier {
    pub fn new(cfg: &TelegramConfig) -> Result<Self, NotifyError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| NotifyError::ApiError(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self {
            bot_token: cfg.bot_token.clone(),
            client,
            api_base: API_BASE.to_string(),
        })
    }

    #[cfg(test)]
    pub(crate) fn with_api_base(mut self, api_base: &str) -> Self {
        self.api_base = api_base.to_string();
        self
    }

    /// Bot API endpoint. Contains the token, never log it.
    pub fn api_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.api_base, self.bot_token, method)
    }
}

#[async_trait::async_trait]
impl Notifier for TelegramNotifier {
    async fn notify(&self, subject: &str, body: &str, recipient: &str) -> Result<(), NotifyError> {
        sender::send_message(self, recipient, &sender::compose_message(subject, body)).await
    }
}

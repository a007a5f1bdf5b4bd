pub mod telegram;

use crate::model::NotifyError;

pub use telegram::TelegramNotifier;

/// Delivery channel for finished summaries.
#[async_trait::async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, subject: &str, body: &str, recipient: &str) -> Result<(), NotifyError>;
}

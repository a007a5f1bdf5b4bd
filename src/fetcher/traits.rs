use crate::model::{FetchError, PriceSeries};

/// Source of daily price history for a ticker symbol.
#[async_trait::async_trait]
pub trait HistoryFetcher: Send + Sync {
    /// Downloads the trailing `period` (e.g. `1y`) of daily bars.
    async fn fetch_history(&self, symbol: &str, period: &str) -> Result<PriceSeries, FetchError>;
}

/// Raw chart payload transport, one request per call.
#[async_trait::async_trait]
pub trait ChartSource: Send + Sync {
    async fn get_chart(&self, symbol: &str, period: &str) -> Result<String, FetchError>;
}

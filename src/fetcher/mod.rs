pub mod fetcher;
pub mod traits;

pub use fetcher::{HttpChartSource, YahooFetcher};
pub use traits::{ChartSource, HistoryFetcher};

use crate::config::FetchConfig;
use crate::fetcher::traits::{ChartSource, HistoryFetcher};
use crate::model::{FetchError, PriceSeries};
use crate::parser::yahoo_parser::{Parser, YahooChartParser};
use rand::Rng;
use reqwest::{Client, Url};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

const BASE_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart";

/// Yahoo Finance chart endpoint over HTTP.
pub struct HttpChartSource {
    client: Client,
    base_url: Url,
}

impl HttpChartSource {
    pub fn new(cfg: &FetchConfig) -> Result<Self, FetchError> {
        let client = Client::builder()
            .user_agent("Mozilla/5.0 (X11; Linux x86_64) StockSniper/0.1")
            .timeout(Duration::from_secs(cfg.timeout_seconds))
            .build()
            .map_err(|e| FetchError::HttpError(e.to_string()))?;
        let base_url = Url::parse(BASE_URL).map_err(|e| FetchError::HttpError(e.to_string()))?;
        Ok(Self { client, base_url })
    }

    /// Appends the symbol as a single percent-encoded path segment.
    fn build_url(&self, symbol: &str) -> Result<Url, FetchError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| FetchError::HttpError(format!("cannot extend base url {}", self.base_url)))?
            .pop_if_empty()
            .push(symbol);
        Ok(url)
    }
}

#[async_trait::async_trait]
impl ChartSource for HttpChartSource {
    async fn get_chart(&self, symbol: &str, period: &str) -> Result<String, FetchError> {
        let response = self
            .client
            .get(self.build_url(symbol)?)
            .query(&[("range", period), ("interval", "1d"), ("events", "history")])
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    FetchError::Timeout
                } else {
                    FetchError::HttpError(e.to_string())
                }
            })?;

        let status = response.status();
        // Yahoo answers unknown symbols with 404 and a chart error body.
        if !status.is_success() && status.as_u16() != 404 {
            return Err(FetchError::InvalidResponse(status.as_u16()));
        }

        response
            .text()
            .await
            .map_err(|e| FetchError::HttpError(e.to_string()))
    }
}

pub struct YahooFetcher<S = HttpChartSource> {
    source: S,
    parser: YahooChartParser,
    max_retries: u32,
    backoff_base_ms: u64,
}

impl YahooFetcher {
    pub fn new(cfg: &FetchConfig) -> Result<Self, FetchError> {
        Ok(Self::with_source(HttpChartSource::new(cfg)?, cfg))
    }
}

impl<S: ChartSource> YahooFetcher<S> {
    pub fn with_source(source: S, cfg: &FetchConfig) -> Self {
        Self {
            source,
            parser: YahooChartParser::new(),
            max_retries: cfg.max_retries,
            backoff_base_ms: cfg.retry_backoff_ms,
        }
    }

    async fn fetch_once(&self, symbol: &str, period: &str) -> Result<PriceSeries, FetchError> {
        let body = self.source.get_chart(symbol, period).await?;
        self.parser.parse(symbol, &body)
    }

    fn backoff(&self, attempt: u32) -> Duration {
        let base = self.backoff_base_ms.saturating_mul(1 << attempt.min(6));
        let jitter = rand::rng().random_range(0..=base / 2);
        Duration::from_millis(base + jitter)
    }
}

#[async_trait::async_trait]
impl<S: ChartSource> HistoryFetcher for YahooFetcher<S> {
    async fn fetch_history(&self, symbol: &str, period: &str) -> Result<PriceSeries, FetchError> {
        let mut attempt = 0;
        loop {
            debug!("Fetching {} ({}), attempt {}", symbol, period, attempt + 1);
            match self.fetch_once(symbol, period).await {
                Ok(series) => return Ok(series),
                Err(e) if e.is_transient() && attempt < self.max_retries => {
                    let delay = self.backoff(attempt);
                    warn!("Fetch {} failed ({}), retrying in {:?}", symbol, e, delay);
                    sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

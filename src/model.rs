// Core structs: PriceBar, PriceSeries, IndicatorRow, Summary and the error types
use chrono::NaiveDate;
use serde::Serialize;
use thiserror::Error;

/// One daily OHLC bar.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

/// Bars ordered by strictly ascending date.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriceSeries {
    bars: Vec<PriceBar>,
}

impl PriceSeries {
    /// Builds a series, rejecting out-of-order or duplicate dates.
    pub fn new(bars: Vec<PriceBar>) -> Result<Self, AnalysisError> {
        if let Some(pair) = bars.windows(2).find(|w| w[1].date <= w[0].date) {
            return Err(AnalysisError::InvalidInput(format!(
                "dates must be strictly ascending: {} is followed by {}",
                pair[0].date, pair[1].date
            )));
        }
        Ok(Self { bars })
    }

    pub fn bars(&self) -> &[PriceBar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }
}

/// A bar extended with every derived indicator. `None` marks a window
/// that does not have enough history yet.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndicatorRow {
    pub bar: PriceBar,
    pub sma_50: Option<f64>,
    pub sma_200: Option<f64>,
    pub sma_20: Option<f64>,
    pub std_20: Option<f64>,
    pub ema_20: f64,
    pub rsi_14: Option<f64>,
    pub macd: f64,
    pub signal_line: f64,
    pub upper_band: Option<f64>,
    pub lower_band: Option<f64>,
}

/// Suggested buy range: lower Bollinger band up to the 20-day mean.
/// `lower <= upper` is not guaranteed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BuyRange {
    pub lower: Option<f64>,
    pub upper: Option<f64>,
}

/// Latest indicator values rounded to 2 decimals for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndicatorSnapshot {
    pub date: NaiveDate,
    pub close: f64,
    pub sma_50: Option<f64>,
    pub sma_200: Option<f64>,
    pub sma_20: Option<f64>,
    pub std_20: Option<f64>,
    pub ema_20: f64,
    pub rsi_14: Option<f64>,
    pub macd: f64,
    pub signal_line: f64,
    pub upper_band: Option<f64>,
    pub lower_band: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub buy_range: BuyRange,
    pub snapshot: IndicatorSnapshot,
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum AnalysisError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("insufficient data: no rows to summarize")]
    InsufficientData,
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("http error: {0}")]
    HttpError(String),
    #[error("request timed out")]
    Timeout,
    #[error("unexpected response status {0}")]
    InvalidResponse(u16),
    #[error("malformed payload: {0}")]
    ParseError(String),
    #[error("no data for symbol: {0}")]
    NoData(String),
    #[error(transparent)]
    Series(#[from] AnalysisError),
}

impl FetchError {
    /// Whether another attempt might succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            FetchError::HttpError(_) | FetchError::Timeout => true,
            FetchError::InvalidResponse(status) => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("notification api error: {0}")]
    ApiError(String),
    #[error("notification service unreachable")]
    Unreachable,
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    DatabaseError(#[from] rusqlite::Error),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Why a single symbol's pipeline run failed.
#[derive(Debug, Error)]
pub enum SymbolError {
    #[error("fetch failed: {0}")]
    Fetch(#[from] FetchError),
    #[error("analysis failed: {0}")]
    Analysis(#[from] AnalysisError),
}

// Yahoo Finance chart payload parsing
use crate::model::{FetchError, PriceBar, PriceSeries};
use crate::utils::trading_date;
use serde::Deserialize;
use std::collections::BTreeMap;

#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    result: Option<Vec<ChartResult>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    meta: ChartMeta,
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: ChartIndicators,
}

#[derive(Debug, Deserialize)]
struct ChartMeta {
    #[serde(default)]
    gmtoffset: i64,
}

#[derive(Debug, Deserialize)]
struct ChartIndicators {
    #[serde(default)]
    quote: Vec<Quote>,
}

#[derive(Debug, Default, Deserialize)]
struct Quote {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<u64>>,
}

pub trait Parser {
    fn parse(&self, symbol: &str, body: &str) -> Result<PriceSeries, FetchError>;
}

/// Turns a `v8/finance/chart` response into a daily price series.
pub struct YahooChartParser;

impl YahooChartParser {
    pub fn new() -> Self {
        Self
    }
}

impl Default for YahooChartParser {
    fn default() -> Self {
        Self::new()
    }
}

impl Parser for YahooChartParser {
    fn parse(&self, symbol: &str, body: &str) -> Result<PriceSeries, FetchError> {
        let envelope: ChartEnvelope =
            serde_json::from_str(body).map_err(|e| FetchError::ParseError(e.to_string()))?;

        if let Some(err) = envelope.chart.error {
            return Err(FetchError::NoData(format!(
                "{}: {} ({})",
                symbol,
                err.code,
                err.description.unwrap_or_default()
            )));
        }

        let result = envelope
            .chart
            .result
            .and_then(|r| r.into_iter().next())
            .ok_or_else(|| FetchError::NoData(symbol.to_string()))?;

        let quote = result.indicators.quote.into_iter().next().unwrap_or_default();
        let offset = result.meta.gmtoffset;

        // Keyed by date so a repeated day keeps its last bar.
        let mut by_date = BTreeMap::new();
        for (i, &ts) in result.timestamp.iter().enumerate() {
            let Some(close) = quote.close.get(i).copied().flatten() else {
                continue;
            };
            let Some(date) = trading_date(ts, offset) else {
                continue;
            };
            let pick = |values: &[Option<f64>]| values.get(i).copied().flatten().unwrap_or(close);
            by_date.insert(
                date,
                PriceBar {
                    date,
                    open: pick(quote.open.as_slice()),
                    high: pick(quote.high.as_slice()),
                    low: pick(quote.low.as_slice()),
                    close,
                    volume: quote.volume.get(i).copied().flatten().unwrap_or(0),
                },
            );
        }

        if by_date.is_empty() {
            return Err(FetchError::NoData(symbol.to_string()));
        }

        Ok(PriceSeries::new(by_date.into_values().collect())?)
    }
}

use crate::analyzer::market_indicators::{Bollinger, Ema, Macd, Rsi};
use crate::analyzer::rolling::RollingWindow;
use crate::model::{
    AnalysisError, BuyRange, IndicatorRow, IndicatorSnapshot, PriceSeries, Summary,
};
use crate::utils::{fmt_opt, round2, round2_opt};
use std::fmt;

pub const SMA_SHORT: usize = 50;
pub const SMA_LONG: usize = 200;
pub const EMA_SPAN: usize = 20;
pub const RSI_PERIOD: usize = 14;
pub const MACD_FAST: usize = 12;
pub const MACD_SLOW: usize = 26;
pub const MACD_SIGNAL: usize = 9;
pub const BAND_PERIOD: usize = 20;
pub const BAND_WIDTH: f64 = 2.0;

/// Trait defining the interface for a price series analyzer.
pub trait Analyzer {
    /// Extends every bar with its derived indicators. Strictly causal.
    fn compute_indicators(&self, series: &PriceSeries) -> Result<Vec<IndicatorRow>, AnalysisError>;
    /// Reduces the latest row into a buy range and a rounded snapshot.
    fn summarize(&self, rows: &[IndicatorRow]) -> Result<Summary, AnalysisError>;
}

/// Implementation of the daily indicator analyzer.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnalyzerImpl;

impl AnalyzerImpl {
    pub fn new() -> Self {
        Self
    }
}

/// Per-series accumulator state; one instance per `compute_indicators` call.
struct IndicatorState {
    sma_short: RollingWindow,
    sma_long: RollingWindow,
    ema: Ema,
    rsi: Rsi,
    macd: Macd,
    bands: Bollinger,
}

impl IndicatorState {
    fn new() -> Self {
        Self {
            sma_short: RollingWindow::new(SMA_SHORT),
            sma_long: RollingWindow::new(SMA_LONG),
            ema: Ema::new(EMA_SPAN),
            rsi: Rsi::new(RSI_PERIOD),
            macd: Macd::new(MACD_FAST, MACD_SLOW, MACD_SIGNAL),
            bands: Bollinger::new(BAND_PERIOD, BAND_WIDTH),
        }
    }
}

impl Analyzer for AnalyzerImpl {
    fn compute_indicators(&self, series: &PriceSeries) -> Result<Vec<IndicatorRow>, AnalysisError> {
        if series.is_empty() {
            return Err(AnalysisError::InvalidInput("price series is empty".into()));
        }
        if let Some(bar) = series.bars().iter().find(|b| !b.close.is_finite()) {
            return Err(AnalysisError::InvalidInput(format!(
                "non-finite close {} on {}",
                bar.close, bar.date
            )));
        }

        let mut state = IndicatorState::new();
        let rows = series
            .bars()
            .iter()
            .map(|bar| {
                let close = bar.close;
                state.sma_short.push(close);
                state.sma_long.push(close);
                let macd = state.macd.next(close);
                let bands = state.bands.next(close);

                IndicatorRow {
                    bar: bar.clone(),
                    sma_50: state.sma_short.mean(),
                    sma_200: state.sma_long.mean(),
                    sma_20: bands.map(|b| b.middle),
                    std_20: bands.map(|b| b.std_dev),
                    ema_20: state.ema.next(close),
                    rsi_14: state.rsi.next(close),
                    macd: macd.macd,
                    signal_line: macd.signal,
                    upper_band: bands.map(|b| b.upper),
                    lower_band: bands.map(|b| b.lower),
                }
            })
            .collect();

        Ok(rows)
    }

    fn summarize(&self, rows: &[IndicatorRow]) -> Result<Summary, AnalysisError> {
        let latest = rows.last().ok_or(AnalysisError::InsufficientData)?;

        let buy_range = BuyRange {
            lower: round2_opt(latest.lower_band),
            upper: round2_opt(latest.sma_20),
        };
        let snapshot = IndicatorSnapshot {
            date: latest.bar.date,
            close: round2(latest.bar.close),
            sma_50: round2_opt(latest.sma_50),
            sma_200: round2_opt(latest.sma_200),
            sma_20: round2_opt(latest.sma_20),
            std_20: round2_opt(latest.std_20),
            ema_20: round2(latest.ema_20),
            rsi_14: round2_opt(latest.rsi_14),
            macd: round2(latest.macd),
            signal_line: round2(latest.signal_line),
            upper_band: round2_opt(latest.upper_band),
            lower_band: round2_opt(latest.lower_band),
        };

        Ok(Summary { buy_range, snapshot })
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = &self.snapshot;
        writeln!(f, "As of: {}", s.date)?;
        writeln!(f, "Current Price: ${:.2}", s.close)?;
        writeln!(
            f,
            "Suggested Buy Range: ${} - ${}",
            fmt_opt(self.buy_range.lower),
            fmt_opt(self.buy_range.upper)
        )?;
        writeln!(f, "Technical Indicators:")?;
        writeln!(f, "50-Day SMA: ${}", fmt_opt(s.sma_50))?;
        writeln!(f, "200-Day SMA: ${}", fmt_opt(s.sma_200))?;
        writeln!(f, "20-Day EMA: ${:.2}", s.ema_20)?;
        writeln!(f, "RSI: {}", fmt_opt(s.rsi_14))?;
        writeln!(f, "MACD: {:.2} (signal {:.2})", s.macd, s.signal_line)?;
        writeln!(f, "Bollinger Upper Band: ${}", fmt_opt(s.upper_band))?;
        write!(f, "Bollinger Lower Band: ${}", fmt_opt(s.lower_band))
    }
}

// Analyzer module: the indicator engine and the summary reducer.

pub mod rolling;
pub mod market_indicators;
pub mod price_analysis;

// Re-export the main Analyzer implementation for ease of use.
pub use price_analysis::{Analyzer, AnalyzerImpl};

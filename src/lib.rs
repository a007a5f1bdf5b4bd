pub mod analyzer;
pub mod batch;
pub mod config;
pub mod fetcher;
pub mod model;
pub mod normalizer;
pub mod notifier;
pub mod parser;
pub mod storage;
pub mod utils;

pub use analyzer::{Analyzer, AnalyzerImpl};
pub use model::{AnalysisError, BuyRange, IndicatorRow, PriceBar, PriceSeries, Summary};

pub mod yahoo_parser;

pub use yahoo_parser::YahooChartParser;

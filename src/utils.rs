// Utility functions
use chrono::{DateTime, NaiveDate};

/// Rounds to 2 decimal places, ties to even.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}

pub fn round2_opt(value: Option<f64>) -> Option<f64> {
    value.map(round2)
}

/// Converts a unix timestamp to the local trading date given the exchange offset in seconds.
pub fn trading_date(timestamp: i64, gmt_offset: i64) -> Option<NaiveDate> {
    DateTime::from_timestamp(timestamp + gmt_offset, 0).map(|dt| dt.date_naive())
}

/// Formats an optional value, printing `n/a` when undefined.
pub fn fmt_opt(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.2}", v),
        None => "n/a".to_string(),
    }
}

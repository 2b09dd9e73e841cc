// =================================================================
// data/types.rs - Price Series Types
// =================================================================

use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One daily bar for a single ticker.
///
/// A series of these is expected to be ordered by `timestamp` (strictly
/// increasing) and to contain a single ticker. The repository enforces that
/// contract when it is built from raw rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    /// Trading day
    pub timestamp: NaiveDate,
    /// Ticker identifier, opaque
    pub ticker: String,
    /// Closing price
    pub close: Decimal,
    /// Session high
    pub high: Decimal,
    /// Session low
    pub low: Decimal,
}

impl PricePoint {
    pub fn new(
        timestamp: NaiveDate,
        ticker: impl Into<String>,
        close: Decimal,
        high: Decimal,
        low: Decimal,
    ) -> Self {
        Self {
            timestamp,
            ticker: ticker.into(),
            close,
            high,
            low,
        }
    }

    /// Bar where high, low and close are all the same price.
    pub fn flat(timestamp: NaiveDate, ticker: impl Into<String>, price: Decimal) -> Self {
        Self::new(timestamp, ticker, price, price, price)
    }

    /// Close as `f64`, for indicator math.
    pub fn close_f64(&self) -> f64 {
        self.close.to_f64().unwrap_or_default()
    }
}

/// Data layer error types
#[derive(Error, Debug)]
pub enum DataError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Missing column: {0}")]
    MissingColumn(String),

    #[error("Data parsing error: {0}")]
    Parse(String),

    #[error("No price data for ticker: {0}")]
    NoData(String),
}

use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;

/// Backtest error types
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BacktestError {
    /// Rejected before any computation starts
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Position sizing needs a strictly positive close
    #[error("Non-positive close price {close} at index {index} ({timestamp}), cannot size position")]
    NonPositivePrice {
        index: usize,
        timestamp: NaiveDate,
        close: Decimal,
    },
}

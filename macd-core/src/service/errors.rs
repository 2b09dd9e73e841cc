use macd_common::data::DataError;
use thiserror::Error;

use crate::backtest::BacktestError;
use crate::indicators::IndicatorError;

/// Service layer error types
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Data error: {0}")]
    Data(#[from] DataError),

    #[error("No price data for ticker: {0}")]
    NoData(String),

    #[error("Backtest error: {0}")]
    Backtest(#[from] BacktestError),

    #[error("Indicator error: {0}")]
    Indicator(#[from] IndicatorError),

    #[error("Task error: {0}")]
    Task(String),
}

impl ServiceError {
    /// Whether the failure is tied to the input rather than the run itself
    pub fn is_input_error(&self) -> bool {
        match self {
            ServiceError::NoData(_) => true,
            ServiceError::Backtest(BacktestError::InvalidInput(_)) => true,
            ServiceError::Indicator(_) => true,
            ServiceError::Data(DataError::NoData(_)) => true,
            ServiceError::Data(_) => false,
            ServiceError::Backtest(_) => false,
            ServiceError::Task(_) => false,
        }
    }
}

pub mod engine;
pub mod errors;
pub mod metrics;
pub mod types;

pub use engine::{position_size, BacktestEngine};
pub use errors::BacktestError;
pub use metrics::MetricsCalculator;
pub use types::*;

use macd_common::data::PricePoint;

/// Check the ordering contract a backtest relies on.
///
/// The series must be non-empty, hold a single ticker, and have strictly
/// increasing timestamps.
pub fn validate_series(prices: &[PricePoint]) -> Result<(), BacktestError> {
    let first = prices
        .first()
        .ok_or_else(|| BacktestError::InvalidInput("empty price series".to_string()))?;

    if let Some(other) = prices.iter().find(|p| p.ticker != first.ticker) {
        return Err(BacktestError::InvalidInput(format!(
            "series mixes tickers {} and {}",
            first.ticker, other.ticker
        )));
    }

    if let Some(pair) = prices.windows(2).find(|w| w[1].timestamp <= w[0].timestamp) {
        return Err(BacktestError::InvalidInput(format!(
            "timestamps not strictly increasing: {} followed by {}",
            pair[0].timestamp, pair[1].timestamp
        )));
    }

    Ok(())
}

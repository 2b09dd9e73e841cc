use macd_common::data::PricePoint;
use serde::Serialize;
use tracing::info;

use super::ServiceError;
use crate::backtest::{validate_series, BacktestEngine, BacktestError, BacktestResult};
use crate::config::StrategySettings;
use crate::indicators::{
    compute_macd, detect_crossovers, scan_support_resistance, CrossoverEvent, IndicatorPoint,
    SupportResistance,
};

/// Everything one ticker's run produces, ready for rendering or storage
#[derive(Debug, Clone, Serialize)]
pub struct TickerReport {
    pub ticker: String,
    pub settings: StrategySettings,
    /// Index-aligned with the input series
    pub indicators: Vec<IndicatorPoint>,
    pub crossovers: Vec<CrossoverEvent>,
    pub backtest: BacktestResult,
    pub levels: SupportResistance,
}

/// Run the full pipeline for one ticker's series.
///
/// Settings and series are validated before anything is computed. The run
/// owns all of its state, so independent calls never affect each other.
pub fn analyze_series(
    ticker: &str,
    prices: &[PricePoint],
    settings: &StrategySettings,
) -> Result<TickerReport, ServiceError> {
    settings.validate()?;
    validate_series(prices)?;
    if let Some(other) = prices.iter().find(|p| p.ticker != ticker) {
        return Err(BacktestError::InvalidInput(format!(
            "series for {} contains rows for {}",
            ticker, other.ticker
        ))
        .into());
    }

    let indicators = compute_macd(prices, &settings.macd)?;
    let crossovers = detect_crossovers(&indicators);
    let backtest = BacktestEngine::new(ticker, settings.backtest).run(prices, &crossovers);
    let levels = scan_support_resistance(prices, settings.sr_window);

    info!(
        "{}: {} crossovers, {} support and {} resistance levels",
        ticker,
        crossovers.len(),
        levels.support.len(),
        levels.resistance.len()
    );

    Ok(TickerReport {
        ticker: ticker.to_string(),
        settings: *settings,
        indicators,
        crossovers,
        backtest,
        levels,
    })
}

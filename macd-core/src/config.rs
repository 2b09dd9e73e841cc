use config::{Config, ConfigError, Environment, File};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::backtest::{BacktestError, BacktestParams};
use crate::indicators::MacdParams;

/// Parameters for one analysis run.
///
/// Passed explicitly into every run, so runs with different settings can
/// execute side by side.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrategySettings {
    pub macd: MacdParams,
    pub backtest: BacktestParams,
    /// Half-width of the support/resistance window
    pub sr_window: usize,
}

impl Default for StrategySettings {
    fn default() -> Self {
        Self {
            macd: MacdParams::default(),
            backtest: BacktestParams::default(),
            sr_window: 10,
        }
    }
}

impl StrategySettings {
    /// Load settings from `config/{RUN_MODE}` (optional) and `MACD__*`
    /// environment variables, e.g. `MACD__MACD__FAST_WINDOW=8` or
    /// `MACD__BACKTEST__TRADE_SIZE_FRACTION=0.25`.
    pub fn new() -> Result<Self, ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = Config::builder()
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            .add_source(
                Environment::with_prefix("MACD")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;
        s.try_deserialize()
    }

    pub fn validate(&self) -> Result<(), BacktestError> {
        let invalid = |msg: String| Err(BacktestError::InvalidInput(msg));
        let macd = &self.macd;
        let backtest = &self.backtest;

        if macd.fast_window == 0 {
            return invalid("fast_window must be positive".to_string());
        }
        if macd.slow_window <= macd.fast_window {
            return invalid(format!(
                "slow_window ({}) must exceed fast_window ({})",
                macd.slow_window, macd.fast_window
            ));
        }
        if macd.signal_window == 0 {
            return invalid("signal_window must be positive".to_string());
        }
        if backtest.initial_balance < Decimal::ZERO {
            return invalid(format!(
                "initial_balance must not be negative, got {}",
                backtest.initial_balance
            ));
        }
        if backtest.trade_size_fraction <= Decimal::ZERO || backtest.trade_size_fraction > Decimal::ONE {
            return invalid(format!(
                "trade_size_fraction must be in (0, 1], got {}",
                backtest.trade_size_fraction
            ));
        }
        if self.sr_window == 0 {
            return invalid("sr_window must be at least 1".to_string());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_defaults() {
        let settings = StrategySettings::default();
        assert_eq!(settings.macd.fast_window, 12);
        assert_eq!(settings.macd.slow_window, 26);
        assert_eq!(settings.macd.signal_window, 9);
        assert_eq!(settings.backtest.initial_balance, dec!(10000));
        assert_eq!(settings.backtest.trade_size_fraction, dec!(0.1));
        assert_eq!(settings.sr_window, 10);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_rejects_bad_windows() {
        let mut settings = StrategySettings::default();
        settings.macd.slow_window = 12;
        assert!(settings.validate().is_err());

        let mut settings = StrategySettings::default();
        settings.macd.signal_window = 0;
        assert!(settings.validate().is_err());

        let mut settings = StrategySettings::default();
        settings.sr_window = 0;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_rejects_bad_sizing() {
        let mut settings = StrategySettings::default();
        settings.backtest.trade_size_fraction = dec!(1.5);
        assert!(settings.validate().is_err());

        settings.backtest.trade_size_fraction = Decimal::ZERO;
        assert!(settings.validate().is_err());

        settings.backtest.trade_size_fraction = Decimal::ONE;
        settings.backtest.initial_balance = dec!(-1);
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_partial_document_keeps_defaults() {
        let s = Config::builder()
            .add_source(File::from_str(
                "[macd]\nfast_window = 5\n\n[backtest]\ntrade_size_fraction = 0.25\n",
                config::FileFormat::Toml,
            ))
            .build()
            .unwrap();
        let settings: StrategySettings = s.try_deserialize().unwrap();

        assert_eq!(settings.macd.fast_window, 5);
        assert_eq!(settings.macd.slow_window, 26);
        assert_eq!(settings.backtest.trade_size_fraction, dec!(0.25));
        assert_eq!(settings.backtest.initial_balance, dec!(10000));
        assert_eq!(settings.sr_window, 10);
    }
}

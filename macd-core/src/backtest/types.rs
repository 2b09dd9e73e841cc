use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::indicators::CrossKind;

/// Sizing parameters for one simulation run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BacktestParams {
    /// Starting cash
    pub initial_balance: Decimal,
    /// Share of current cash committed to each buy, in (0, 1]
    pub trade_size_fraction: Decimal,
}

impl Default for BacktestParams {
    fn default() -> Self {
        Self {
            initial_balance: Decimal::from(10_000),
            trade_size_fraction: Decimal::new(1, 1),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Buy,
    Sell,
}

/// One honored signal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeRecord {
    pub ticker: String,
    pub side: Side,
    pub price: Decimal,
    pub shares: Decimal,
    pub timestamp: NaiveDate,
    /// Bar index the trade executed on
    pub index: usize,
}

/// Cash and holding of a single-ticker, long-only account
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub cash_balance: Decimal,
    /// Zero when flat
    pub shares_held: Decimal,
}

impl Position {
    pub fn new(cash_balance: Decimal) -> Self {
        Self {
            cash_balance,
            shares_held: Decimal::ZERO,
        }
    }

    pub fn is_flat(&self) -> bool {
        self.shares_held.is_zero()
    }

    pub fn is_holding(&self) -> bool {
        self.shares_held > Decimal::ZERO
    }

    /// Cash plus holding marked at `price`
    pub fn value_at(&self, price: Decimal) -> Decimal {
        self.cash_balance + self.shares_held * price
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquityPoint {
    pub timestamp: NaiveDate,
    pub value: Decimal,
}

/// A crossover the simulator could not act on
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedSignal {
    pub index: usize,
    pub timestamp: NaiveDate,
    pub kind: CrossKind,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    /// Percent change from initial to final balance
    pub total_return: Decimal,
    pub total_trades: u32,
    /// Completed buy/sell pairs
    pub round_trips: u32,
    pub winning_trades: u32,
    pub losing_trades: u32,
    /// Percent of round trips closed at a profit
    pub win_rate: Decimal,
    pub realized_pnl: Decimal,
    pub total_volume: Decimal,
    /// Largest peak-to-trough fall of the equity curve, in percent
    pub max_drawdown: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestResult {
    pub ticker: String,
    pub params: BacktestParams,
    pub trades: Vec<TradeRecord>,
    /// Cash left at series end
    pub cash_balance: Decimal,
    /// Shares still open at series end
    pub shares_held: Decimal,
    pub last_close: Option<Decimal>,
    /// Cash plus open shares marked at the last close
    pub final_balance: Decimal,
    pub equity_curve: Vec<EquityPoint>,
    pub skipped: Vec<SkippedSignal>,
    pub metrics: Metrics,
}

impl BacktestResult {
    pub fn is_holding(&self) -> bool {
        self.shares_held > Decimal::ZERO
    }

    pub fn buys(&self) -> impl Iterator<Item = &TradeRecord> {
        self.trades.iter().filter(|t| t.side == Side::Buy)
    }

    pub fn sells(&self) -> impl Iterator<Item = &TradeRecord> {
        self.trades.iter().filter(|t| t.side == Side::Sell)
    }
}

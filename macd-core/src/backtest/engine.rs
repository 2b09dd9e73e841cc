// macd-core/src/backtest/engine.rs

use macd_common::data::PricePoint;
use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use super::errors::BacktestError;
use super::metrics::MetricsCalculator;
use super::types::*;
use crate::indicators::{CrossKind, CrossoverEvent};

/// Shares bought when committing `fraction` of `balance` at `close`.
///
/// A zero or negative close cannot be sized and yields
/// [`BacktestError::NonPositivePrice`].
pub fn position_size(
    balance: Decimal,
    fraction: Decimal,
    close: Decimal,
    index: usize,
    timestamp: chrono::NaiveDate,
) -> Result<Decimal, BacktestError> {
    let error = BacktestError::NonPositivePrice {
        index,
        timestamp,
        close,
    };
    if close <= Decimal::ZERO {
        return Err(error);
    }
    (balance * fraction).checked_div(close).ok_or(error)
}

/// Long-only, single-position simulator for one ticker.
///
/// The engine owns its account state and is consumed by [`run`](Self::run),
/// so every run starts flat with the configured balance.
pub struct BacktestEngine {
    ticker: String,
    params: BacktestParams,
    position: Position,
    trades: Vec<TradeRecord>,
    equity_points: Vec<EquityPoint>,
    skipped: Vec<SkippedSignal>,
    metrics_calculator: MetricsCalculator,
}

impl BacktestEngine {
    pub fn new(ticker: impl Into<String>, params: BacktestParams) -> Self {
        Self {
            ticker: ticker.into(),
            params,
            position: Position::new(params.initial_balance),
            trades: Vec::new(),
            equity_points: Vec::new(),
            skipped: Vec::new(),
            metrics_calculator: MetricsCalculator::new(),
        }
    }

    /// Replay `events` against `prices`.
    ///
    /// Events must share the price series' index space and be ordered by
    /// index; events pointing past the end of the series are ignored.
    pub fn run(mut self, prices: &[PricePoint], events: &[CrossoverEvent]) -> BacktestResult {
        info!(
            "Starting backtest for {}: {} bars, {} crossovers",
            self.ticker,
            prices.len(),
            events.len()
        );

        let mut pending = events.iter().peekable();
        for (index, bar) in prices.iter().enumerate() {
            while let Some(event) = pending.next_if(|e| e.index <= index) {
                if event.index == index {
                    self.on_event(event, bar);
                }
            }
            self.record_equity_point(bar);
        }

        let last_close = prices.last().map(|p| p.close);
        let final_balance = match last_close {
            Some(close) => self.position.value_at(close),
            None => self.position.cash_balance,
        };

        let metrics = self.metrics_calculator.calculate(
            &self.trades,
            &self.equity_points,
            self.params.initial_balance,
            final_balance,
        );

        info!(
            "Backtest completed for {}: {} trades, final balance {}{}",
            self.ticker,
            self.trades.len(),
            final_balance,
            if self.position.is_holding() { " (position open)" } else { "" }
        );

        BacktestResult {
            ticker: self.ticker,
            params: self.params,
            trades: self.trades,
            cash_balance: self.position.cash_balance,
            shares_held: self.position.shares_held,
            last_close,
            final_balance,
            equity_curve: self.equity_points,
            skipped: self.skipped,
            metrics,
        }
    }

    fn on_event(&mut self, event: &CrossoverEvent, bar: &PricePoint) {
        match event.kind {
            CrossKind::Bullish => {
                // one open position at a time, no pyramiding
                if !self.position.is_flat() || self.position.cash_balance <= Decimal::ZERO {
                    return;
                }
                match self.open_position(event.index, bar) {
                    Ok(trade) => self.record_trade(trade),
                    Err(e) => {
                        warn!("Skipping BUY signal for {}: {}", self.ticker, e);
                        self.skipped.push(SkippedSignal {
                            index: event.index,
                            timestamp: bar.timestamp,
                            kind: event.kind,
                            reason: e.to_string(),
                        });
                    }
                }
            }
            CrossKind::Bearish => {
                // long-only: a bearish cross only closes
                if self.position.is_holding() {
                    let trade = self.close_position(event.index, bar);
                    self.record_trade(trade);
                }
            }
        }
    }

    fn open_position(&mut self, index: usize, bar: &PricePoint) -> Result<TradeRecord, BacktestError> {
        let shares = position_size(
            self.position.cash_balance,
            self.params.trade_size_fraction,
            bar.close,
            index,
            bar.timestamp,
        )?;

        self.position.cash_balance -= shares * bar.close;
        self.position.shares_held = shares;

        Ok(TradeRecord {
            ticker: self.ticker.clone(),
            side: Side::Buy,
            price: bar.close,
            shares,
            timestamp: bar.timestamp,
            index,
        })
    }

    fn close_position(&mut self, index: usize, bar: &PricePoint) -> TradeRecord {
        let shares = self.position.shares_held;
        self.position.cash_balance += shares * bar.close;
        self.position.shares_held = Decimal::ZERO;

        TradeRecord {
            ticker: self.ticker.clone(),
            side: Side::Sell,
            price: bar.close,
            shares,
            timestamp: bar.timestamp,
            index,
        }
    }

    fn record_trade(&mut self, trade: TradeRecord) {
        debug!(
            "Executed trade: {} {:?} {} @ {}",
            trade.timestamp, trade.side, trade.shares, trade.price
        );
        self.trades.push(trade);
    }

    fn record_equity_point(&mut self, bar: &PricePoint) {
        self.equity_points.push(EquityPoint {
            timestamp: bar.timestamp,
            value: self.position.value_at(bar.close),
        });
    }
}

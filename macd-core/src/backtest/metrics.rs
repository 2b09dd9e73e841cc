use rust_decimal::Decimal;

use super::types::*;

/// A buy matched with the sell that closed it
struct RoundTrip {
    pnl: Decimal,
}

pub struct MetricsCalculator;

impl Default for MetricsCalculator {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricsCalculator {
    pub fn new() -> Self {
        Self
    }

    pub fn calculate(
        &self,
        trades: &[TradeRecord],
        equity_points: &[EquityPoint],
        initial_balance: Decimal,
        final_balance: Decimal,
    ) -> Metrics {
        let round_trips = self.match_round_trips(trades);
        let winning = round_trips.iter().filter(|t| t.pnl > Decimal::ZERO).count();
        // break-even round trips count as neither
        let losing = round_trips.iter().filter(|t| t.pnl < Decimal::ZERO).count();

        Metrics {
            total_return: self.calculate_total_return(initial_balance, final_balance),
            total_trades: trades.len() as u32,
            round_trips: round_trips.len() as u32,
            winning_trades: winning as u32,
            losing_trades: losing as u32,
            win_rate: self.calculate_win_rate(winning, round_trips.len()),
            realized_pnl: round_trips.iter().map(|t| t.pnl).sum(),
            total_volume: self.calculate_total_volume(trades),
            max_drawdown: self.calculate_max_drawdown(equity_points),
        }
    }

    fn match_round_trips(&self, trades: &[TradeRecord]) -> Vec<RoundTrip> {
        let mut open: Option<&TradeRecord> = None;
        let mut round_trips = Vec::new();

        for trade in trades {
            match trade.side {
                Side::Buy => open = Some(trade),
                Side::Sell => {
                    if let Some(buy) = open.take() {
                        round_trips.push(RoundTrip {
                            pnl: (trade.price - buy.price) * trade.shares,
                        });
                    }
                }
            }
        }

        round_trips
    }

    fn calculate_total_return(&self, initial: Decimal, final_balance: Decimal) -> Decimal {
        if initial.is_zero() {
            return Decimal::ZERO;
        }
        (final_balance - initial) / initial * Decimal::ONE_HUNDRED
    }

    fn calculate_win_rate(&self, winning: usize, total: usize) -> Decimal {
        if total == 0 {
            return Decimal::ZERO;
        }
        Decimal::from(winning) / Decimal::from(total) * Decimal::ONE_HUNDRED
    }

    fn calculate_total_volume(&self, trades: &[TradeRecord]) -> Decimal {
        trades.iter().map(|t| t.shares * t.price).sum()
    }

    fn calculate_max_drawdown(&self, equity_points: &[EquityPoint]) -> Decimal {
        let mut peak = Decimal::ZERO;
        let mut max_drawdown = Decimal::ZERO;

        for point in equity_points {
            if point.value > peak {
                peak = point.value;
            } else if peak > Decimal::ZERO {
                let drawdown = (peak - point.value) / peak * Decimal::ONE_HUNDRED;
                if drawdown > max_drawdown {
                    max_drawdown = drawdown;
                }
            }
        }

        max_drawdown
    }
}

//! MACD (Moving Average Convergence Divergence) over a daily close series.
//!
//! EMAs follow the non-adjusted recurrence: the first output equals the first
//! input, every later output is `previous + k * (price - previous)` with
//! `k = 2 / (window + 1)`. No warm-up bars are dropped, so the output is
//! index-aligned with the input.
//!
//! In increment form a flat input stays exactly flat: a constant series yields
//! MACD and signal of exactly `0.0`.

use chrono::NaiveDate;
use macd_common::data::PricePoint;
use serde::{Deserialize, Serialize};
use ta::{Next, Reset};

use super::IndicatorError;

/// Window lengths for the fast, slow and signal EMAs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MacdParams {
    pub fast_window: usize,
    pub slow_window: usize,
    pub signal_window: usize,
}

impl Default for MacdParams {
    fn default() -> Self {
        Self {
            fast_window: 12,
            slow_window: 26,
            signal_window: 9,
        }
    }
}

/// Indicator values for one bar
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IndicatorPoint {
    pub timestamp: NaiveDate,
    pub ema_fast: f64,
    pub ema_slow: f64,
    /// `ema_fast - ema_slow`
    pub macd: f64,
    /// EMA of `macd` over the signal window
    pub signal: f64,
}

impl IndicatorPoint {
    pub fn histogram(&self) -> f64 {
        self.macd - self.signal
    }
}

/// Exponential moving average seeded from its first input
#[derive(Debug, Clone)]
pub struct Ema {
    k: f64,
    current: Option<f64>,
}

impl Ema {
    pub fn new(name: &'static str, window: usize) -> Result<Self, IndicatorError> {
        if window == 0 {
            return Err(IndicatorError::InvalidWindow { name, window });
        }
        Ok(Self {
            k: 2.0 / (window as f64 + 1.0),
            current: None,
        })
    }
}

impl Next<f64> for Ema {
    type Output = f64;

    fn next(&mut self, input: f64) -> f64 {
        let value = match self.current {
            Some(prev) => prev + self.k * (input - prev),
            None => input,
        };
        self.current = Some(value);
        value
    }
}

impl Reset for Ema {
    fn reset(&mut self) {
        self.current = None;
    }
}

/// Compute the MACD and signal lines for `prices`.
///
/// Returns one point per input bar, in input order. An empty input yields an
/// empty output; a single bar yields one point with zero MACD and signal.
pub fn compute_macd(
    prices: &[PricePoint],
    params: &MacdParams,
) -> Result<Vec<IndicatorPoint>, IndicatorError> {
    let mut fast = Ema::new("fast", params.fast_window)?;
    let mut slow = Ema::new("slow", params.slow_window)?;
    let mut signal = Ema::new("signal", params.signal_window)?;

    let points = prices
        .iter()
        .map(|price| {
            let close = price.close_f64();
            let ema_fast = fast.next(close);
            let ema_slow = slow.next(close);
            let macd = ema_fast - ema_slow;

            IndicatorPoint {
                timestamp: price.timestamp,
                ema_fast,
                ema_slow,
                macd,
                signal: signal.next(macd),
            }
        })
        .collect();

    Ok(points)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn series(closes: &[f64]) -> Vec<PricePoint> {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        closes
            .iter()
            .enumerate()
            .map(|(i, &close)| {
                PricePoint::flat(
                    start + chrono::Duration::days(i as i64),
                    "TEST",
                    Decimal::try_from(close).unwrap(),
                )
            })
            .collect()
    }

    fn reference_ema(values: &[f64], window: usize) -> Vec<f64> {
        let k = 2.0 / (window as f64 + 1.0);
        let mut out: Vec<f64> = Vec::with_capacity(values.len());
        for &value in values {
            let next = match out.last() {
                Some(&prev) => k * value + (1.0 - k) * prev,
                None => value,
            };
            out.push(next);
        }
        out
    }

    #[test]
    fn test_output_aligned_with_input() {
        let prices = series(&[10.0, 11.0, 12.5, 11.8, 13.0, 12.2]);
        let points = compute_macd(&prices, &MacdParams::default()).unwrap();

        assert_eq!(points.len(), prices.len());
        for (point, price) in points.iter().zip(&prices) {
            assert_eq!(point.timestamp, price.timestamp);
        }
    }

    #[test]
    fn test_first_point_seeds_from_close() {
        let prices = series(&[42.0, 40.0]);
        let points = compute_macd(&prices, &MacdParams::default()).unwrap();

        assert_eq!(points[0].ema_fast, 42.0);
        assert_eq!(points[0].ema_slow, 42.0);
        assert_eq!(points[0].macd, 0.0);
        assert_eq!(points[0].signal, 0.0);
    }

    #[test]
    fn test_matches_non_adjusted_recurrence() {
        let closes = [10.0, 10.5, 11.2, 10.9, 11.7, 12.4, 12.1, 13.0, 12.6, 13.3];
        let params = MacdParams {
            fast_window: 3,
            slow_window: 6,
            signal_window: 4,
        };
        let points = compute_macd(&series(&closes), &params).unwrap();

        let fast = reference_ema(&closes, 3);
        let slow = reference_ema(&closes, 6);
        let macd: Vec<f64> = fast.iter().zip(&slow).map(|(f, s)| f - s).collect();
        let signal = reference_ema(&macd, 4);

        for (i, point) in points.iter().enumerate() {
            assert!((point.ema_fast - fast[i]).abs() < 1e-9);
            assert!((point.ema_slow - slow[i]).abs() < 1e-9);
            assert!((point.macd - macd[i]).abs() < 1e-9);
            assert!((point.signal - signal[i]).abs() < 1e-9);
            assert!((point.histogram() - (macd[i] - signal[i])).abs() < 1e-9);
        }
    }

    #[test]
    fn test_constant_series_has_exactly_zero_macd() {
        for cents in (1..20_000).step_by(7) {
            let close = cents as f64 / 100.0;
            let prices = series(&[close; 40]);
            let points = compute_macd(&prices, &MacdParams::default()).unwrap();
            let seed = points[0].ema_fast;

            for point in &points {
                assert_eq!(point.ema_fast, seed, "close {}", close);
                assert_eq!(point.ema_slow, seed, "close {}", close);
                assert_eq!(point.macd, 0.0, "close {}", close);
                assert_eq!(point.signal, 0.0, "close {}", close);
            }
        }
    }

    #[test]
    fn test_ema_reset_reseeds() {
        let mut ema = Ema::new("test", 3).unwrap();
        assert_eq!(ema.next(4.0), 4.0);
        assert_eq!(ema.next(8.0), 6.0);

        ema.reset();
        assert_eq!(ema.next(1.0), 1.0);
    }

    #[test]
    fn test_degenerate_lengths() {
        let params = MacdParams::default();
        assert!(compute_macd(&[], &params).unwrap().is_empty());
        assert_eq!(compute_macd(&series(&[5.0]), &params).unwrap().len(), 1);
    }

    #[test]
    fn test_zero_window_rejected() {
        let params = MacdParams {
            fast_window: 0,
            ..MacdParams::default()
        };
        assert_eq!(
            compute_macd(&series(&[1.0]), &params),
            Err(IndicatorError::InvalidWindow { name: "fast", window: 0 })
        );
    }
}

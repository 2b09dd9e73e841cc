//! MACD / signal line crossover detection

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::macd::IndicatorPoint;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CrossKind {
    /// MACD moved from at-or-below the signal line to strictly above it
    Bullish,
    /// MACD moved from at-or-above the signal line to strictly below it
    Bearish,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrossoverEvent {
    /// Position in the price/indicator series
    pub index: usize,
    pub kind: CrossKind,
    pub timestamp: NaiveDate,
}

/// Classify the step from `prev` to `curr`.
///
/// Equality on the current bar is never a cross; it can only be the "before"
/// side of one.
pub fn classify_cross(prev: &IndicatorPoint, curr: &IndicatorPoint) -> Option<CrossKind> {
    if curr.macd > curr.signal && prev.macd <= prev.signal {
        Some(CrossKind::Bullish)
    } else if curr.macd < curr.signal && prev.macd >= prev.signal {
        Some(CrossKind::Bearish)
    } else {
        None
    }
}

/// Scan adjacent pairs and return every crossover in index order.
pub fn detect_crossovers(points: &[IndicatorPoint]) -> Vec<CrossoverEvent> {
    points
        .windows(2)
        .enumerate()
        .filter_map(|(i, pair)| {
            classify_cross(&pair[0], &pair[1]).map(|kind| CrossoverEvent {
                index: i + 1,
                kind,
                timestamp: pair[1].timestamp,
            })
        })
        .collect()
}

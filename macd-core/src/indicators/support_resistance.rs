//! Support and Resistance levels detection
//!
//! A bar is a support level when its low is the lowest low of the window
//! around it, and a resistance level when its high is the highest high. The
//! window for bar `i` with half-width `w` covers bars `i - w` up to but not
//! including `i + w`, and only bars with a full window on both sides are
//! scanned.

use chrono::NaiveDate;
use macd_common::data::PricePoint;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LevelKind {
    Support,
    Resistance,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupportResistanceLevel {
    pub timestamp: NaiveDate,
    pub price: Decimal,
    pub kind: LevelKind,
}

/// Levels found in one scan, each list ascending by timestamp
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SupportResistance {
    pub support: Vec<SupportResistanceLevel>,
    pub resistance: Vec<SupportResistanceLevel>,
}

pub fn scan_support_resistance(prices: &[PricePoint], window: usize) -> SupportResistance {
    let mut levels = SupportResistance::default();
    if window == 0 {
        return levels;
    }

    for i in window..prices.len().saturating_sub(window) {
        let span = &prices[i - window..i + window];
        let bar = &prices[i];

        if span.iter().map(|p| p.low).min() == Some(bar.low) {
            levels.support.push(SupportResistanceLevel {
                timestamp: bar.timestamp,
                price: bar.low,
                kind: LevelKind::Support,
            });
        }

        if span.iter().map(|p| p.high).max() == Some(bar.high) {
            levels.resistance.push(SupportResistanceLevel {
                timestamp: bar.timestamp,
                price: bar.high,
                kind: LevelKind::Resistance,
            });
        }
    }

    levels
}

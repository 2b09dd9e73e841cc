// indicators/mod.rs
pub mod macd;
pub mod crossover;
pub mod support_resistance;

use thiserror::Error;

pub use macd::{compute_macd, Ema, IndicatorPoint, MacdParams};
pub use crossover::{classify_cross, detect_crossovers, CrossKind, CrossoverEvent};
pub use support_resistance::{scan_support_resistance, LevelKind, SupportResistance, SupportResistanceLevel};

/// Error types for indicator construction
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IndicatorError {
    #[error("Invalid {name} window: {window}")]
    InvalidWindow { name: &'static str, window: usize },
}

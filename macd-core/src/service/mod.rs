pub mod analysis;
pub mod errors;
pub mod runner;

// Re-export main interfaces
pub use analysis::{analyze_series, TickerReport};
pub use errors::ServiceError;
pub use runner::{BacktestService, RunResults};

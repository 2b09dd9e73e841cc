// data/mod.rs
pub mod types;
pub mod repository;
pub mod csv_loader;

// Re-export main interfaces for easy access
pub use types::{DataError, PricePoint};
pub use repository::{PriceRepository, TickerSummary};
pub use csv_loader::{load_price_file, read_price_points};

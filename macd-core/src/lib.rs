pub mod backtest;
pub mod config;
pub mod indicators;
pub mod logging;
pub mod service;

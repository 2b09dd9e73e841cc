use std::collections::BTreeMap;
use std::sync::Arc;

use macd_common::data::{DataError, PricePoint, PriceRepository};
use tokio::sync::mpsc;
use tokio::task::spawn_blocking;
use tracing::{info, warn};

use super::{analyze_series, ServiceError, TickerReport};
use crate::config::StrategySettings;

/// Per-ticker results of a multi-ticker run, keyed by ticker
pub type RunResults = BTreeMap<String, Result<TickerReport, ServiceError>>;

/// Runs analyses against a shared, read-only price repository
pub struct BacktestService {
    /// Price data (wrapped in Arc for sharing across tasks)
    repository: Arc<PriceRepository>,
    /// Parameters applied to every run
    settings: StrategySettings,
}

fn load_series<'a>(
    repository: &'a PriceRepository,
    ticker: &str,
) -> Result<&'a [PricePoint], ServiceError> {
    repository.series(ticker).map_err(|e| match e {
        DataError::NoData(ticker) => ServiceError::NoData(ticker),
        other => ServiceError::Data(other),
    })
}

impl BacktestService {
    pub fn new(repository: Arc<PriceRepository>, settings: StrategySettings) -> Self {
        Self {
            repository,
            settings,
        }
    }

    pub fn settings(&self) -> &StrategySettings {
        &self.settings
    }

    pub fn tickers(&self) -> Vec<String> {
        self.repository.tickers().into_iter().map(String::from).collect()
    }

    /// Analyze a single ticker.
    pub fn run_ticker(&self, ticker: &str) -> Result<TickerReport, ServiceError> {
        let prices = load_series(&self.repository, ticker)?;
        analyze_series(ticker, prices, &self.settings)
    }

    /// Analyze every ticker, each as an independent blocking task.
    ///
    /// Failures stay with their ticker; only a task that could not be joined
    /// fails the whole call.
    pub async fn run_all(&self) -> Result<RunResults, ServiceError> {
        let tickers = self.tickers();
        info!("Starting analysis for {} tickers", tickers.len());

        let (result_tx, mut result_rx) = mpsc::channel(tickers.len().max(1));
        let mut handles = Vec::with_capacity(tickers.len());

        for ticker in tickers {
            let tx = result_tx.clone();
            let repository = Arc::clone(&self.repository);
            let settings = self.settings;

            handles.push(spawn_blocking(move || {
                let result = load_series(&repository, &ticker)
                    .and_then(|prices| analyze_series(&ticker, prices, &settings));
                if tx.blocking_send((ticker, result)).is_err() {
                    warn!("Result channel closed before run finished");
                }
            }));
        }
        drop(result_tx);

        let mut results = RunResults::new();
        while let Some((ticker, result)) = result_rx.recv().await {
            if let Err(e) = &result {
                warn!("Analysis failed for {}: {}", ticker, e);
            }
            results.insert(ticker, result);
        }

        for handle in handles {
            handle
                .await
                .map_err(|e| ServiceError::Task(format!("Task failed: {}", e)))?;
        }

        info!("Analysis finished for {} tickers", results.len());
        Ok(results)
    }
}

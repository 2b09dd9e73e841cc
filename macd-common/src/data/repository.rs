// =================================================================
// data/repository.rs - In-memory Price Store
// =================================================================

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use super::types::{DataError, PricePoint};

/// Per-ticker price series, each sorted by date and free of duplicate days.
#[derive(Debug, Clone, Default)]
pub struct PriceRepository {
    series: BTreeMap<String, Vec<PricePoint>>,
}

/// Aggregate view of one ticker's history
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TickerSummary {
    pub ticker: String,
    pub records: usize,
    pub first_date: NaiveDate,
    pub last_date: NaiveDate,
    pub mean_close: Decimal,
    pub min_low: Decimal,
    pub max_high: Decimal,
}

impl PriceRepository {
    /// Build a repository from raw rows in any order.
    ///
    /// Rows are grouped by ticker and sorted ascending by date. When the same
    /// (ticker, date) appears more than once the last row wins.
    pub fn from_points<I>(points: I) -> Self
    where
        I: IntoIterator<Item = PricePoint>,
    {
        let mut by_ticker: BTreeMap<String, BTreeMap<NaiveDate, PricePoint>> = BTreeMap::new();
        for point in points {
            by_ticker
                .entry(point.ticker.clone())
                .or_default()
                .insert(point.timestamp, point);
        }

        let series = by_ticker
            .into_iter()
            .map(|(ticker, days)| (ticker, days.into_values().collect()))
            .collect();

        Self { series }
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    /// Number of tickers held
    pub fn len(&self) -> usize {
        self.series.len()
    }

    /// Tickers in ascending order
    pub fn tickers(&self) -> Vec<&str> {
        self.series.keys().map(String::as_str).collect()
    }

    /// Price series for one ticker.
    pub fn series(&self, ticker: &str) -> Result<&[PricePoint], DataError> {
        match self.series.get(ticker) {
            Some(points) if !points.is_empty() => Ok(points),
            _ => Err(DataError::NoData(ticker.to_string())),
        }
    }

    pub fn summary(&self, ticker: &str) -> Result<TickerSummary, DataError> {
        let points = self.series(ticker)?;
        // series() never hands out an empty slice
        let first = &points[0];
        let last = &points[points.len() - 1];

        let total_close: Decimal = points.iter().map(|p| p.close).sum();
        let min_low = points.iter().map(|p| p.low).min().unwrap_or(first.low);
        let max_high = points.iter().map(|p| p.high).max().unwrap_or(first.high);

        Ok(TickerSummary {
            ticker: ticker.to_string(),
            records: points.len(),
            first_date: first.timestamp,
            last_date: last.timestamp,
            mean_close: total_close / Decimal::from(points.len()),
            min_low,
            max_high,
        })
    }

    pub fn summaries(&self) -> Vec<TickerSummary> {
        self.series
            .keys()
            .filter_map(|ticker| self.summary(ticker).ok())
            .collect()
    }
}

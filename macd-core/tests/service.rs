//! Per-ticker service runs over a shared repository

use std::io::Write;
use std::sync::Arc;

use chrono::NaiveDate;
use macd_common::data::{load_price_file, PricePoint, PriceRepository};
use macd_core::config::StrategySettings;
use macd_core::service::{analyze_series, BacktestService, ServiceError};
use rust_decimal::Decimal;
use tempfile::NamedTempFile;

fn create_points(ticker: &str, count: usize, phase: f64) -> Vec<PricePoint> {
    let start = NaiveDate::from_ymd_opt(2022, 3, 1).unwrap();
    (0..count)
        .map(|i| {
            let x = i as f64 + phase;
            let close = 40.0 + 6.0 * (x / 6.0).sin() + 2.0 * (x / 1.7).cos();
            PricePoint::flat(
                start + chrono::Duration::days(i as i64),
                ticker,
                Decimal::try_from(close).unwrap().round_dp(2),
            )
        })
        .collect()
}

fn create_service() -> BacktestService {
    let mut points = create_points("AAA", 200, 0.0);
    points.extend(create_points("BBB", 180, 3.0));
    points.extend(create_points("CCC", 160, 11.0));
    BacktestService::new(
        Arc::new(PriceRepository::from_points(points)),
        StrategySettings::default(),
    )
}

#[test]
fn test_unknown_ticker_reports_no_data() {
    let service = create_service();
    match service.run_ticker("ZZZ") {
        Err(ServiceError::NoData(ticker)) => assert_eq!(ticker, "ZZZ"),
        other => panic!("expected NoData, got {:?}", other.map(|r| r.ticker)),
    }
}

#[test]
fn test_run_ticker_uses_only_that_ticker() {
    let service = create_service();
    let report = service.run_ticker("BBB").unwrap();

    assert_eq!(report.ticker, "BBB");
    assert_eq!(report.indicators.len(), 180);
    assert!(report.backtest.trades.iter().all(|t| t.ticker == "BBB"));
}

#[tokio::test]
async fn test_run_all_matches_isolated_runs() {
    let service = create_service();
    let results = service.run_all().await.unwrap();

    assert_eq!(results.keys().cloned().collect::<Vec<_>>(), vec!["AAA", "BBB", "CCC"]);

    for (ticker, result) in &results {
        let parallel = result.as_ref().unwrap();
        let isolated = service.run_ticker(ticker).unwrap();
        assert_eq!(parallel.backtest, isolated.backtest);
        assert_eq!(parallel.crossovers, isolated.crossovers);
        assert_eq!(
            parallel.backtest.params.initial_balance,
            service.settings().backtest.initial_balance
        );
    }
}

#[tokio::test]
async fn test_run_all_on_empty_repository() {
    let service = BacktestService::new(
        Arc::new(PriceRepository::default()),
        StrategySettings::default(),
    );
    assert!(service.run_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_invalid_settings_fail_every_ticker() {
    let mut settings = StrategySettings::default();
    settings.backtest.trade_size_fraction = Decimal::from(2);

    let service = BacktestService::new(
        Arc::new(PriceRepository::from_points(create_points("AAA", 50, 0.0))),
        settings,
    );
    let results = service.run_all().await.unwrap();

    let err = results["AAA"].as_ref().unwrap_err();
    assert!(err.is_input_error());
}

#[test]
fn test_csv_to_report() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "<Ticker>,<DTYYYYMMDD>,<Open>,<High>,<Low>,<Close>,<Volume>").unwrap();
    // written newest first; the repository sorts by date
    for point in create_points("VNM", 60, 0.0).iter().rev() {
        writeln!(
            file,
            "{},{},{},{},{},{},1000",
            point.ticker,
            point.timestamp.format("%Y%m%d"),
            point.close,
            point.high,
            point.low,
            point.close
        )
        .unwrap();
    }

    let repository = load_price_file(file.path()).unwrap();
    let prices = repository.series("VNM").unwrap();
    let report = analyze_series("VNM", prices, &StrategySettings::default()).unwrap();

    assert_eq!(report.indicators.len(), 60);
    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["ticker"], "VNM");
    assert!(json["backtest"]["trades"].is_array());
    assert!(json["levels"]["support"].is_array());
}

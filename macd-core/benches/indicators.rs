use chrono::NaiveDate;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use macd_common::data::PricePoint;
use macd_core::backtest::{BacktestEngine, BacktestParams};
use macd_core::indicators::{compute_macd, detect_crossovers, scan_support_resistance, MacdParams};
use rust_decimal::Decimal;

fn create_test_series(count: usize) -> Vec<PricePoint> {
    let start = NaiveDate::from_ymd_opt(2000, 1, 3).unwrap();
    (0..count)
        .map(|i| {
            let x = i as f64;
            let close = 100.0 + 10.0 * (x / 9.0).sin() + 0.01 * x;
            let close = Decimal::try_from(close).unwrap_or_default().round_dp(2);
            PricePoint::new(
                start + chrono::Duration::days(i as i64),
                "BENCH",
                close,
                close + Decimal::ONE,
                close - Decimal::ONE,
            )
        })
        .collect()
}

fn bench_compute_macd(c: &mut Criterion) {
    let mut group = c.benchmark_group("compute_macd");
    let params = MacdParams::default();

    for size in [250, 2_500, 25_000].iter() {
        let prices = create_test_series(*size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &prices, |b, prices| {
            b.iter(|| compute_macd(black_box(prices), &params));
        });
    }
    group.finish();
}

fn bench_backtest(c: &mut Criterion) {
    let prices = create_test_series(2_500);
    let indicators = compute_macd(&prices, &MacdParams::default()).unwrap_or_default();
    let events = detect_crossovers(&indicators);

    c.bench_function("backtest_run", |b| {
        b.iter(|| {
            BacktestEngine::new("BENCH", BacktestParams::default())
                .run(black_box(&prices), black_box(&events))
        });
    });
}

fn bench_support_resistance(c: &mut Criterion) {
    let prices = create_test_series(2_500);

    c.bench_function("support_resistance", |b| {
        b.iter(|| scan_support_resistance(black_box(&prices), 10));
    });
}

criterion_group!(benches, bench_compute_macd, bench_backtest, bench_support_resistance);
criterion_main!(benches);

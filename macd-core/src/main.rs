use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use dotenv::dotenv;
use rust_decimal::Decimal;
use tracing::{error, info, warn};

use macd_common::data::load_price_file;
use macd_core::{
    backtest::Side,
    config::StrategySettings,
    logging::init_logging,
    service::{BacktestService, TickerReport},
};

#[derive(Parser)]
#[command(name = "macd-backtest")]
#[command(about = "MACD crossover signals and long-only backtests over daily price files")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List tickers found in a price file
    Tickers {
        #[arg(short, long)]
        data: PathBuf,
    },
    /// Analyze one ticker
    Run {
        #[arg(short, long)]
        data: PathBuf,
        #[arg(short, long)]
        ticker: String,
        #[command(flatten)]
        params: ParamArgs,
        /// Print the full report as JSON
        #[arg(long)]
        json: bool,
        /// Also write the JSON report to this file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Analyze every ticker, each run independently
    RunAll {
        #[arg(short, long)]
        data: PathBuf,
        #[command(flatten)]
        params: ParamArgs,
        #[arg(long)]
        json: bool,
    },
}

/// Overrides applied on top of the loaded settings
#[derive(Args)]
struct ParamArgs {
    #[arg(long)]
    fast: Option<usize>,
    #[arg(long)]
    slow: Option<usize>,
    #[arg(long)]
    signal: Option<usize>,
    #[arg(long)]
    initial_balance: Option<Decimal>,
    #[arg(long)]
    trade_size: Option<Decimal>,
    #[arg(long)]
    sr_window: Option<usize>,
}

impl ParamArgs {
    fn apply(&self, settings: &mut StrategySettings) {
        if let Some(fast) = self.fast {
            settings.macd.fast_window = fast;
        }
        if let Some(slow) = self.slow {
            settings.macd.slow_window = slow;
        }
        if let Some(signal) = self.signal {
            settings.macd.signal_window = signal;
        }
        if let Some(balance) = self.initial_balance {
            settings.backtest.initial_balance = balance;
        }
        if let Some(fraction) = self.trade_size {
            settings.backtest.trade_size_fraction = fraction;
        }
        if let Some(window) = self.sr_window {
            settings.sr_window = window;
        }
    }
}

fn build_service(data: &Path, params: &ParamArgs) -> anyhow::Result<BacktestService> {
    let mut settings = StrategySettings::new().context("Failed to load settings")?;
    params.apply(&mut settings);
    settings.validate()?;

    let repository = load_price_file(data)
        .with_context(|| format!("Failed to load {}", data.display()))?;
    Ok(BacktestService::new(Arc::new(repository), settings))
}

fn print_report(report: &TickerReport) {
    let result = &report.backtest;
    let metrics = &result.metrics;

    println!("\nBacktest Results for {}:", report.ticker);
    println!("Initial Balance: {}", result.params.initial_balance);
    println!("Final Balance: {}", result.final_balance.round_dp(2));
    if result.is_holding() {
        println!(
            "Open Position: {} shares (cash {})",
            result.shares_held.round_dp(4),
            result.cash_balance.round_dp(2)
        );
    }
    println!("Total Return: {}%", metrics.total_return.round_dp(2));
    println!(
        "Total Trades: {} ({} buys, {} sells)",
        metrics.total_trades,
        result.buys().count(),
        result.sells().count()
    );
    println!("Win Rate: {}%", metrics.win_rate.round_dp(2));
    println!("Max Drawdown: {}%", metrics.max_drawdown.round_dp(2));
    println!(
        "Support Levels: {}  Resistance Levels: {}",
        report.levels.support.len(),
        report.levels.resistance.len()
    );

    println!("\nTrade History:");
    for trade in &result.trades {
        println!(
            "{} {} {} @ {}",
            trade.timestamp.format("%Y-%m-%d"),
            if trade.side == Side::Buy { "BUY " } else { "SELL" },
            trade.shares.round_dp(4),
            trade.price
        );
    }
    for skipped in &result.skipped {
        println!("{} skipped: {}", skipped.timestamp.format("%Y-%m-%d"), skipped.reason);
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    init_logging();

    let cli = Cli::parse();

    match cli.command {
        Commands::Tickers { data } => {
            let repository = load_price_file(&data)
                .with_context(|| format!("Failed to load {}", data.display()))?;

            println!(
                "{:<10} {:>8} {:>12} {:>12} {:>12} {:>12} {:>12}",
                "TICKER", "BARS", "FROM", "TO", "MEAN CLOSE", "LOW", "HIGH"
            );
            for summary in repository.summaries() {
                println!(
                    "{:<10} {:>8} {:>12} {:>12} {:>12} {:>12} {:>12}",
                    summary.ticker,
                    summary.records,
                    summary.first_date.to_string(),
                    summary.last_date.to_string(),
                    summary.mean_close.round_dp(2),
                    summary.min_low,
                    summary.max_high
                );
            }
        }

        Commands::Run {
            data,
            ticker,
            params,
            json,
            output,
        } => {
            let service = build_service(&data, &params)?;
            let report = service.run_ticker(&ticker)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_report(&report);
            }

            if let Some(path) = output {
                std::fs::write(&path, serde_json::to_string_pretty(&report)?)
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                info!("Report written to {}", path.display());
            }
        }

        Commands::RunAll { data, params, json } => {
            let service = build_service(&data, &params)?;
            let results = service.run_all().await?;

            let mut reports = Vec::new();
            for (ticker, result) in results {
                match result {
                    Ok(report) => reports.push(report),
                    Err(e) if e.is_input_error() => warn!("Skipped {}: {}", ticker, e),
                    Err(e) => error!("Run failed for {}: {}", ticker, e),
                }
            }

            if json {
                println!("{}", serde_json::to_string_pretty(&reports)?);
            } else {
                println!(
                    "{:<10} {:>8} {:>14} {:>10} {:>8}",
                    "TICKER", "TRADES", "FINAL", "RETURN %", "OPEN"
                );
                for report in &reports {
                    let result = &report.backtest;
                    println!(
                        "{:<10} {:>8} {:>14} {:>10} {:>8}",
                        report.ticker,
                        result.trades.len(),
                        result.final_balance.round_dp(2),
                        result.metrics.total_return.round_dp(2),
                        if result.is_holding() { "yes" } else { "no" }
                    );
                }
            }
        }
    }

    Ok(())
}

//! Sigbench CLI — run strategy grids and query the latest signal.
//!
//! Commands:
//! - `run` — backtest every configured strategy over a directory of CSV bars
//! - `signal` — compute one strategy's signal for one CSV and print the latest action
//! - `strategies` — list registered indicators and the strategies they support

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use sigbench_core::components::{IndicatorKind, SignalOutput, SignalProvider};
use sigbench_core::summary::signal_timeline;
use sigbench_runner::{load_csv, load_directory, run_grid, RunReport, RunnerConfig};

#[derive(Parser)]
#[command(name = "sigbench", about = "Sigbench CLI — signal strategy backtesting")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Backtest a strategy grid over CSV bars and report the best strategy per ticker.
    Run {
        /// TOML run config. Without one, every registered strategy runs with defaults.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Directory holding one `<TICKER>.csv` per ticker.
        #[arg(long, default_value = "data")]
        data_dir: PathBuf,

        /// Tickers to run (e.g. AAPL MSFT).
        #[arg(required = true)]
        tickers: Vec<String>,

        /// Write every task outcome as JSON to this file.
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Compute one strategy's signal over a CSV file.
    Signal {
        /// CSV file with timestamp,open,high,low,close,volume.
        #[arg(long)]
        csv: PathBuf,

        /// Indicator kind (see `strategies`).
        #[arg(long)]
        indicator: String,

        /// Strategy name. Without one, the raw indicator components are printed.
        #[arg(long)]
        strategy: Option<String>,

        /// Indicator parameter override, repeatable (e.g. --param period=30).
        #[arg(long = "param", value_parser = parse_param)]
        params: Vec<(String, f64)>,

        /// Print the full signal-change timeline, not just the latest action.
        #[arg(long, default_value_t = false)]
        timeline: bool,
    },
    /// List registered indicators and their strategies.
    Strategies,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("sigbench=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            config,
            data_dir,
            tickers,
            output,
        } => run_cmd(config.as_deref(), &data_dir, &tickers, output.as_deref()),
        Commands::Signal {
            csv,
            indicator,
            strategy,
            params,
            timeline,
        } => signal_cmd(&csv, &indicator, strategy.as_deref(), params, timeline),
        Commands::Strategies => {
            list_strategies();
            Ok(())
        }
    }
}

fn run_cmd(
    config_path: Option<&Path>,
    data_dir: &Path,
    tickers: &[String],
    output: Option<&Path>,
) -> Result<()> {
    let config = match config_path {
        Some(path) => RunnerConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => RunnerConfig::default(),
    };

    let data = load_directory(data_dir, tickers)
        .with_context(|| format!("loading bars from {}", data_dir.display()))?;
    let report = run_grid(&config, Arc::new(data))?;

    print_report(&report);

    if let Some(path) = output {
        let rows: Vec<serde_json::Value> = report
            .outcomes
            .iter()
            .map(|o| {
                serde_json::json!({
                    "task": o.descriptor,
                    "elapsed_ms": o.elapsed.as_secs_f64() * 1000.0,
                    "result": match &o.result {
                        Ok(r) => serde_json::to_value(r).unwrap_or_default(),
                        Err(e) => serde_json::json!({ "error": e.to_string() }),
                    },
                })
            })
            .collect();
        let json = serde_json::to_string_pretty(&rows)?;
        std::fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
        info!(path = %path.display(), "outcomes written");
    }
    Ok(())
}

fn signal_cmd(
    csv: &Path,
    indicator: &str,
    strategy: Option<&str>,
    params: Vec<(String, f64)>,
    show_timeline: bool,
) -> Result<()> {
    let params: BTreeMap<String, f64> = params.into_iter().collect();
    let mut provider = SignalProvider::from_names(indicator, strategy, &params)?;
    let bars = load_csv(csv).with_context(|| format!("loading {}", csv.display()))?;

    match provider.calculate(&bars)? {
        SignalOutput::Signal(signal) => {
            let last = bars.last().map(|b| b.timestamp);
            match (signal.latest_action(), last) {
                (Some(action), Some(ts)) => println!("{ts}  {action:?}"),
                (None, Some(ts)) => println!("{ts}  no action"),
                _ => bail!("no bars in {}", csv.display()),
            }
            if show_timeline {
                let timestamps: Vec<_> = bars.iter().map(|b| b.timestamp).collect();
                println!();
                for (ts, sig) in signal_timeline(&timestamps, &signal)? {
                    println!("{ts}  {sig}");
                }
            }
        }
        SignalOutput::Components(components) => {
            let Some(i) = components.len().checked_sub(1) else {
                bail!("no bars in {}", csv.display());
            };
            println!("{:<24} {:>14}", "component", "last value");
            println!("{}", "-".repeat(39));
            for name in components.names() {
                println!("{:<24} {:>14.4}", name, components.get(name, i));
            }
        }
    }
    Ok(())
}

fn list_strategies() {
    println!("{:<20} Strategies", "Indicator");
    println!("{}", "-".repeat(60));
    for kind in IndicatorKind::ALL {
        println!("{:<20} {}", kind.name(), kind.strategy_names().join(", "));
    }
}

fn print_report(report: &RunReport) {
    println!();
    println!("=== Best Strategy per Ticker ===");
    println!(
        "{:<8} {:<18} {:<16} {:>10} {:>10} {:>7}  {}",
        "Ticker", "Indicator", "Strategy", "Return", "Hold", "Trades", "Params"
    );
    println!("{}", "-".repeat(90));
    for summary in report.best.values() {
        match &summary.best {
            Some(b) => println!(
                "{:<8} {:<18} {:<16} {:>9.2}% {:>9.2}% {:>7}  {}",
                summary.ticker,
                b.indicator,
                b.strategy,
                b.result.total_return_pct,
                b.result.benchmark_hold_return_pct,
                b.result.trades.len(),
                format_params(&b.params)
            ),
            None => println!("{:<8} (all {} tasks failed)", summary.ticker, summary.failed),
        }
    }
    println!();
    println!(
        "Tasks: {} ok, {} failed, {} skipped  |  memo: {} hits, {} misses",
        report.summary.succeeded,
        report.summary.failed,
        report.summary.skipped,
        report.memo_hits,
        report.memo_misses
    );
    println!();
}

fn format_params(params: &BTreeMap<String, f64>) -> String {
    if params.is_empty() {
        return "defaults".to_string();
    }
    params
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join(",")
}

fn parse_param(s: &str) -> Result<(String, f64), String> {
    let (name, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got '{s}'"))?;
    let value: f64 = value
        .trim()
        .parse()
        .map_err(|e| format!("bad value for {name}: {e}"))?;
    Ok((name.trim().to_string(), value))
}

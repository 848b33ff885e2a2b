//! Backtest tasks — one per (ticker, indicator, strategy, configuration).
//!
//! A task owns its portfolio state and shares nothing mutable with other
//! tasks; the only shared structures are the read-only market data and the
//! component memo. Running a task twice gives the same result.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use sigbench_core::components::{create_indicator, IndicatorKind};
use sigbench_core::domain::{check_ordering, trailing_window_start};
use sigbench_core::fingerprint::ProviderKey;
use sigbench_core::summary::summarize;
use sigbench_core::{BacktestError, BacktestResult, ConfigError, PortfolioSimulator, SimulationConfig};

use crate::config::RunnerConfig;
use crate::market::{MarketData, TickerBars};
use crate::memo::SignalMemo;

/// Everything needed to reproduce one backtest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskDescriptor {
    pub ticker: String,
    pub indicator: IndicatorKind,
    pub strategy: String,
    #[serde(default)]
    pub params: BTreeMap<String, f64>,
    pub simulation: SimulationConfig,
    #[serde(default)]
    pub warmup_bars: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub window_days: Option<u32>,
}

impl TaskDescriptor {
    /// `TICKER:Indicator/Strategy`
    pub fn label(&self) -> String {
        format!("{}:{}/{}", self.ticker, self.indicator, self.strategy)
    }
}

/// Why a task produced no result. Scoped to that task only.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TaskError {
    #[error(transparent)]
    Backtest(#[from] BacktestError),

    #[error("no bars loaded for ticker {0}")]
    MissingBars(String),

    #[error("task panicked: {0}")]
    Panicked(String),
}

impl From<ConfigError> for TaskError {
    fn from(e: ConfigError) -> Self {
        TaskError::Backtest(e.into())
    }
}

/// Cross every ticker with every grid entry of `config`.
pub fn expand_tasks(tickers: &[String], config: &RunnerConfig) -> Result<Vec<TaskDescriptor>, ConfigError> {
    config.validate()?;
    let specs = config.provider_specs()?;
    let simulation = config.simulation.to_simulation_config();

    Ok(tickers
        .iter()
        .flat_map(|ticker| {
            specs.iter().map(|spec| TaskDescriptor {
                ticker: ticker.clone(),
                indicator: spec.indicator,
                strategy: spec.strategy.to_string(),
                params: spec.params.clone(),
                simulation: simulation.clone(),
                warmup_bars: config.simulation.warmup_bars,
                window_days: config.simulation.window_days,
            })
        })
        .collect())
}

/// Run one task against already-loaded data.
pub fn run_task(
    task: &TaskDescriptor,
    data: &MarketData,
    memo: &SignalMemo,
) -> Result<BacktestResult, TaskError> {
    let ticker = data
        .get(&task.ticker)
        .ok_or_else(|| TaskError::MissingBars(task.ticker.clone()))?;
    run_on_bars(task, ticker, memo)
}

/// Signals are computed over the full history. The simulation window then
/// drops the first `warmup_bars` bars and, with `window_days`, everything
/// older than that many days before the last bar, whichever cuts more.
pub fn run_on_bars(
    task: &TaskDescriptor,
    ticker: &TickerBars,
    memo: &SignalMemo,
) -> Result<BacktestResult, TaskError> {
    let simulator = PortfolioSimulator::new(task.simulation.clone())?;
    let indicator = create_indicator(task.indicator, &task.params)?;
    let rule = task.indicator.strategy(&task.strategy)?;

    let bars = ticker.bars();
    check_ordering(bars).map_err(BacktestError::from)?;

    let key = ProviderKey::new(task.indicator.name(), &indicator.params());
    let components = memo.get_or_compute(&key, ticker.fingerprint(), || indicator.compute(bars));
    let signal = rule.evaluate(&components, bars);

    let trailing = task
        .window_days
        .map_or(0, |days| trailing_window_start(bars, days));
    let skip = task.warmup_bars.min(bars.len()).max(trailing);
    let window = &bars[skip..];
    let window_signal = signal.skip(skip);

    let outcome = simulator.run(window, &window_signal)?;
    Ok(summarize(window, &window_signal, outcome)?)
}

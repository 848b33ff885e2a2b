//! Grid runner: config + market data → every task → best strategy per ticker.
//!
//! Two entry points:
//! - `run_grid()`: builds its own pool from the config; used by the CLI.
//! - `run_grid_with_pool()`: takes a caller-owned pool, so the caller keeps
//!   the cancel handle.

use std::collections::BTreeMap;
use std::sync::Arc;

use thiserror::Error;
use tracing::info;

use sigbench_core::ConfigError;

use crate::aggregate::{Aggregator, TickerSummary};
use crate::config::RunnerConfig;
use crate::market::MarketData;
use crate::memo::SignalMemo;
use crate::pool::{PoolError, RunSummary, TaskOutcome, WorkerPool};
use crate::task::expand_tasks;

/// Errors that stop a run before any task starts.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Pool(#[from] PoolError),
    #[error("no market data loaded")]
    NoData,
}

/// Everything a finished run produced.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub outcomes: Vec<TaskOutcome>,
    /// Completed tickers only; a cancelled run may leave some out.
    pub best: BTreeMap<String, TickerSummary>,
    pub summary: RunSummary,
    pub memo_hits: usize,
    pub memo_misses: usize,
}

pub fn run_grid(config: &RunnerConfig, data: Arc<MarketData>) -> Result<RunReport, RunError> {
    config.validate()?;
    let pool = WorkerPool::new(&config.pool)?;
    run_grid_with_pool(config, data, &pool)
}

pub fn run_grid_with_pool(
    config: &RunnerConfig,
    data: Arc<MarketData>,
    pool: &WorkerPool,
) -> Result<RunReport, RunError> {
    if data.is_empty() {
        return Err(RunError::NoData);
    }
    let tickers: Vec<String> = data.tickers().map(str::to_string).collect();
    let tasks = expand_tasks(&tickers, config)?;
    info!(tickers = tickers.len(), tasks = tasks.len(), interval = %config.interval, "grid expanded");

    let memo = Arc::new(SignalMemo::new());
    let mut aggregator = Aggregator::new(&tasks);
    let mut best = BTreeMap::new();
    let mut outcomes = Vec::with_capacity(tasks.len());

    let summary = pool.run(tasks, data, Arc::clone(&memo), |outcome| {
        if let Some(done) = aggregator.record(&outcome) {
            best.insert(done.ticker.clone(), done);
        }
        outcomes.push(outcome);
    });

    Ok(RunReport {
        outcomes,
        best,
        summary,
        memo_hits: memo.hits(),
        memo_misses: memo.misses(),
    })
}

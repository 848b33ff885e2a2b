//! Sigbench Runner — backtest orchestration over many tickers and strategies.
//!
//! This crate builds on `sigbench-core` to provide:
//! - TOML run configuration and strategy grid expansion
//! - CSV bar loading with validation
//! - A shared component memo across tasks
//! - A bounded worker pool with coarse cancellation
//! - Best-strategy-per-ticker aggregation

pub mod aggregate;
pub mod config;
pub mod data_loader;
pub mod market;
pub mod memo;
pub mod pool;
pub mod runner;
pub mod task;

pub use aggregate::{Aggregator, BestResult, TickerSummary};
pub use config::{PoolConfig, RunnerConfig, SimulationSettings, StrategyGrid};
pub use data_loader::{load_csv, load_directory, LoadError};
pub use market::{MarketData, TickerBars};
pub use memo::SignalMemo;
pub use pool::{RunSummary, TaskOutcome, WorkerPool};
pub use runner::{run_grid, run_grid_with_pool, RunError, RunReport};
pub use task::{expand_tasks, run_task, TaskDescriptor, TaskError};

#[cfg(test)]
mod send_sync_checks {
    use super::*;

    fn assert_send<T: Send>() {}
    fn assert_sync<T: Sync>() {}

    #[test]
    fn shared_state_is_send_sync() {
        assert_send::<MarketData>();
        assert_sync::<MarketData>();
        assert_send::<SignalMemo>();
        assert_sync::<SignalMemo>();
    }

    #[test]
    fn task_types_are_send() {
        assert_send::<TaskDescriptor>();
        assert_send::<TaskOutcome>();
        assert_send::<TaskError>();
    }

    #[test]
    fn config_types_are_send_sync() {
        assert_send::<RunnerConfig>();
        assert_sync::<RunnerConfig>();
    }
}

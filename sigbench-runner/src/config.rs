//! Run configuration, loaded from TOML.
//!
//! ```toml
//! interval = "1d"
//!
//! [pool]
//! workers = 8
//! queue_capacity = 128
//!
//! [simulation]
//! purchase_fraction = 0.25
//! execution_price = "next_bar"
//! warmup_bars = 60
//! window_days = 180
//!
//! [[strategies]]
//! indicator = "RSI"
//! strategies = ["RSI", "RSI_Cross"]
//! params = { slow_period = 21 }
//! ```
//!
//! Every field has a default. With no `[[strategies]]` table the grid is every
//! registered indicator with every strategy it supports.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use sigbench_core::components::{create_indicator, IndicatorKind};
use sigbench_core::{ConfigError, ExecutionPricePolicy, SimulationConfig};

use crate::data_loader::LoadError;

/// Bar intervals a run may declare.
pub const SUPPORTED_INTERVALS: &[&str] = &[
    "1m", "2m", "5m", "15m", "30m", "60m", "90m", "1h", "1d", "5d", "1wk", "1mo", "3mo",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    pub interval: String,
    pub pool: PoolConfig,
    pub simulation: SimulationSettings,
    pub strategies: Vec<StrategyGrid>,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            interval: "1d".into(),
            pool: PoolConfig::default(),
            simulation: SimulationSettings::default(),
            strategies: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    pub workers: usize,
    /// Tasks buffered between the producer and the workers.
    pub queue_capacity: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            workers: 4,
            queue_capacity: 64,
        }
    }
}

/// Simulator settings plus the bar window that is actually simulated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationSettings {
    pub initial_capital: f64,
    pub purchase_fraction: f64,
    pub sell_fraction: f64,
    pub take_profit_multiplier: f64,
    pub backoff: u32,
    pub execution_price: ExecutionPricePolicy,
    /// Leading bars used only to warm indicators up; never simulated.
    pub warmup_bars: usize,
    /// Simulate only the trailing calendar days up to the last bar.
    /// Earlier bars still feed the indicators.
    pub window_days: Option<u32>,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        let sim = SimulationConfig::default();
        Self {
            initial_capital: sim.initial_capital,
            purchase_fraction: sim.purchase_fraction,
            sell_fraction: sim.sell_fraction,
            take_profit_multiplier: sim.take_profit_multiplier,
            backoff: sim.backoff,
            execution_price: sim.execution_price,
            warmup_bars: 0,
            window_days: None,
        }
    }
}

impl SimulationSettings {
    pub fn to_simulation_config(&self) -> SimulationConfig {
        SimulationConfig {
            initial_capital: self.initial_capital,
            purchase_fraction: self.purchase_fraction,
            sell_fraction: self.sell_fraction,
            take_profit_multiplier: self.take_profit_multiplier,
            backoff: self.backoff,
            execution_price: self.execution_price,
        }
    }
}

/// One indicator configuration and the strategies to run on it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyGrid {
    pub indicator: String,
    /// Empty means every strategy the indicator supports.
    #[serde(default)]
    pub strategies: Vec<String>,
    #[serde(default)]
    pub params: BTreeMap<String, f64>,
}

/// A resolved (indicator, strategy, params) triple.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderSpec {
    pub indicator: IndicatorKind,
    pub strategy: &'static str,
    pub params: BTreeMap<String, f64>,
}

impl RunnerConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    pub fn load(path: &Path) -> Result<Self, LoadError> {
        let content = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::from_toml_str(&content)?)
    }

    /// Check everything that can be checked before a task is queued.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !SUPPORTED_INTERVALS.contains(&self.interval.as_str()) {
            return Err(ConfigError::UnsupportedInterval(self.interval.clone()));
        }
        if self.pool.workers == 0 {
            return Err(ConfigError::invalid("pool.workers", 0.0, "must be >= 1"));
        }
        if self.pool.queue_capacity == 0 {
            return Err(ConfigError::invalid("pool.queue_capacity", 0.0, "must be >= 1"));
        }
        if self.simulation.window_days == Some(0) {
            return Err(ConfigError::invalid("simulation.window_days", 0.0, "must be >= 1"));
        }
        self.simulation.to_simulation_config().validate()?;
        self.provider_specs().map(|_| ())
    }

    /// Expand the strategy grid, resolving every name through the registry.
    pub fn provider_specs(&self) -> Result<Vec<ProviderSpec>, ConfigError> {
        if self.strategies.is_empty() {
            return Ok(default_grid());
        }

        let mut specs = Vec::new();
        for grid in &self.strategies {
            let kind: IndicatorKind = grid.indicator.parse()?;
            // rejects bad or unknown params up front
            create_indicator(kind, &grid.params)?;

            let names: Vec<&'static str> = if grid.strategies.is_empty() {
                kind.strategy_names()
            } else {
                grid.strategies
                    .iter()
                    .map(|s| kind.strategy(s).map(|rule| rule.name))
                    .collect::<Result<_, _>>()?
            };
            specs.extend(names.into_iter().map(|strategy| ProviderSpec {
                indicator: kind,
                strategy,
                params: grid.params.clone(),
            }));
        }
        Ok(specs)
    }
}

/// Every registered indicator with default params × every supported strategy.
pub fn default_grid() -> Vec<ProviderSpec> {
    IndicatorKind::ALL
        .into_iter()
        .flat_map(|kind| {
            kind.strategy_names().into_iter().map(move |strategy| ProviderSpec {
                indicator: kind,
                strategy,
                params: BTreeMap::new(),
            })
        })
        .collect()
}

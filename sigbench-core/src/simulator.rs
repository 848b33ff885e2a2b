//! Portfolio simulator — replays a signal series against prices.
//!
//! State is implicit in `holdings` (flat at 0, invested above 0). Each bar
//! fires exactly one transition, BUY checked before SELL:
//!
//! - BUY  when `capital > 0`, signal is +1 and cooldown is 0
//! - SELL when `holdings > 0`, signal is -1, cooldown is 0 and the fill price
//!   clears `average_cost_basis * take_profit_multiplier` strictly
//! - HOLD otherwise; cooldown ticks down by one while `backoff > 0`
//!
//! The loop performs no I/O, never suspends and never mutates its inputs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::domain::{validate_series, Bar, Signal, SignalSeries, Trade, TradeSide};
use crate::error::{AlignmentError, BacktestError, ConfigError};

/// Which bar's price fills a signal observed at bar `i`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionPricePolicy {
    /// Fill at bar `i`'s close. The final value marks holdings at the last close.
    #[default]
    SameBar,
    /// Fill at bar `i + 1`'s open. A signal on the last bar cannot fill and is
    /// treated as HOLD; the final value marks holdings at the last open.
    NextBar,
}

impl ExecutionPricePolicy {
    fn fill_price(self, bars: &[Bar], i: usize) -> Option<f64> {
        match self {
            ExecutionPricePolicy::SameBar => Some(bars[i].close),
            ExecutionPricePolicy::NextBar => bars.get(i + 1).map(|b| b.open),
        }
    }

    fn fill_index(self, i: usize) -> usize {
        match self {
            ExecutionPricePolicy::SameBar => i,
            ExecutionPricePolicy::NextBar => i + 1,
        }
    }

    fn terminal_price(self, last: &Bar) -> f64 {
        match self {
            ExecutionPricePolicy::SameBar => last.close,
            ExecutionPricePolicy::NextBar => last.open,
        }
    }
}

/// Position sizing, take-profit and cooldown rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub initial_capital: f64,
    /// Share of `max(initial_capital, capital)` spent per BUY, in (0, 1].
    pub purchase_fraction: f64,
    /// Share of the holdings watermark sold per SELL, in (0, 1].
    pub sell_fraction: f64,
    /// Minimum fill price / cost basis ratio for a SELL, >= 1.
    pub take_profit_multiplier: f64,
    /// Bars of cooldown after each executed trade.
    pub backoff: u32,
    pub execution_price: ExecutionPricePolicy,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            initial_capital: 10_000.0,
            purchase_fraction: 0.5,
            sell_fraction: 0.5,
            take_profit_multiplier: 1.04,
            backoff: 0,
            execution_price: ExecutionPricePolicy::SameBar,
        }
    }
}

impl SimulationConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let unit_interval = |name: &str, v: f64| {
            if v > 0.0 && v <= 1.0 {
                Ok(())
            } else {
                Err(ConfigError::invalid(name, v, "must be in (0, 1]"))
            }
        };

        if !(self.initial_capital.is_finite() && self.initial_capital > 0.0) {
            return Err(ConfigError::invalid(
                "initial_capital",
                self.initial_capital,
                "must be finite and > 0",
            ));
        }
        unit_interval("purchase_fraction", self.purchase_fraction)?;
        unit_interval("sell_fraction", self.sell_fraction)?;
        if !(self.take_profit_multiplier.is_finite() && self.take_profit_multiplier >= 1.0) {
            return Err(ConfigError::invalid(
                "take_profit_multiplier",
                self.take_profit_multiplier,
                "must be finite and >= 1",
            ));
        }
        Ok(())
    }
}

/// Capital and position at one point of the simulation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PortfolioState {
    pub capital: f64,
    pub holdings: f64,
    pub average_cost_basis: f64,
    /// Peak holdings since the last full liquidation.
    pub max_holdings_watermark: f64,
    pub cooldown: u32,
}

impl PortfolioState {
    pub fn new(initial_capital: f64) -> Self {
        Self {
            capital: initial_capital,
            holdings: 0.0,
            average_cost_basis: 0.0,
            max_holdings_watermark: 0.0,
            cooldown: 0,
        }
    }

    /// Capital plus holdings marked at `price`.
    pub fn value_at(&self, price: f64) -> f64 {
        self.capital + self.holdings * price
    }

    pub fn is_flat(&self) -> bool {
        self.holdings == 0.0
    }
}

/// Which rule fired on a bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Transition {
    Buy,
    Sell,
    Hold,
}

/// State after one bar plus its mark-to-market value at the bar's close.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BarSnapshot {
    pub bar_index: usize,
    pub timestamp: DateTime<Utc>,
    pub transition: Transition,
    pub state: PortfolioState,
    pub equity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationOutcome {
    /// One snapshot per bar, in bar order.
    pub trajectory: Vec<BarSnapshot>,
    pub trades: Vec<Trade>,
    pub final_state: PortfolioState,
    pub terminal_price: f64,
    pub final_portfolio_value: f64,
    pub total_return_pct: f64,
}

#[derive(Debug, Clone)]
pub struct PortfolioSimulator {
    config: SimulationConfig,
}

impl PortfolioSimulator {
    pub fn new(config: SimulationConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Apply one bar's transition to `state` at `fill_price`.
    pub fn step(&self, state: &mut PortfolioState, signal: Signal, fill_price: f64) -> Transition {
        let cfg = &self.config;

        if signal == Signal::Buy && state.capital > 0.0 && state.cooldown == 0 {
            let amount = state
                .capital
                .min(cfg.initial_capital.max(state.capital) * cfg.purchase_fraction);
            let shares = amount / fill_price;
            state.average_cost_basis = (fill_price * shares
                + state.average_cost_basis * state.holdings)
                / (shares + state.holdings);
            state.holdings += shares;
            state.capital -= amount;
            state.cooldown = cfg.backoff;
            state.max_holdings_watermark = state.max_holdings_watermark.max(state.holdings);
            return Transition::Buy;
        }

        if signal == Signal::Sell
            && state.holdings > 0.0
            && state.cooldown == 0
            && fill_price > state.average_cost_basis * cfg.take_profit_multiplier
        {
            let sell_qty = state.holdings.min(
                (state.max_holdings_watermark * cfg.sell_fraction)
                    .max(cfg.initial_capital * cfg.purchase_fraction),
            );
            state.holdings -= sell_qty;
            state.capital += sell_qty * fill_price;
            state.cooldown = cfg.backoff;
            if state.holdings == 0.0 {
                state.max_holdings_watermark = 0.0;
            }
            return Transition::Sell;
        }

        if cfg.backoff > 0 && state.cooldown > 0 {
            state.cooldown -= 1;
        }
        Transition::Hold
    }

    /// Replay `signal` over `bars`.
    ///
    /// Fails on a length mismatch, an empty series, unordered timestamps, or
    /// any non-finite or non-positive price. No bar is ever skipped.
    pub fn run(&self, bars: &[Bar], signal: &SignalSeries) -> Result<SimulationOutcome, BacktestError> {
        AlignmentError::check("signal", bars.len(), signal.len())?;
        validate_series(bars)?;

        let policy = self.config.execution_price;
        let mut state = PortfolioState::new(self.config.initial_capital);
        let mut trajectory = Vec::with_capacity(bars.len());
        let mut trades = Vec::new();

        for (i, (bar, sig)) in bars.iter().zip(signal.iter()).enumerate() {
            // A signal that cannot fill is a hold.
            let (sig, fill_price) = match policy.fill_price(bars, i) {
                Some(price) => (sig, price),
                None => (Signal::Hold, bar.close),
            };

            let held_before = state.holdings;
            let transition = self.step(&mut state, sig, fill_price);
            if let Some(side) = match transition {
                Transition::Buy => Some(TradeSide::Buy),
                Transition::Sell => Some(TradeSide::Sell),
                Transition::Hold => None,
            } {
                let fill_index = policy.fill_index(i);
                let qty = (state.holdings - held_before).abs();
                trace!(bar = i, %side, price = fill_price, quantity = qty, "trade executed");
                trades.push(Trade {
                    bar_index: fill_index,
                    timestamp: bars[fill_index].timestamp,
                    side,
                    price: fill_price,
                    quantity: qty,
                });
            }

            trajectory.push(BarSnapshot {
                bar_index: i,
                timestamp: bar.timestamp,
                transition,
                state,
                equity: state.value_at(bar.close),
            });
        }

        // validate_series guarantees at least one bar
        let last = &bars[bars.len() - 1];
        let terminal_price = policy.terminal_price(last);
        let final_portfolio_value = state.value_at(terminal_price);
        let initial = self.config.initial_capital;

        Ok(SimulationOutcome {
            trajectory,
            trades,
            final_state: state,
            terminal_price,
            final_portfolio_value,
            total_return_pct: (final_portfolio_value - initial) / initial * 100.0,
        })
    }

    /// Like `run`, for signals supplied as raw numbers. Values outside
    /// {-1, 0, +1} or non-finite values are a data quality error.
    pub fn run_raw(&self, bars: &[Bar], signal: &[f64]) -> Result<SimulationOutcome, BacktestError> {
        AlignmentError::check("signal", bars.len(), signal.len())?;
        let series = SignalSeries::from_raw(signal)?;
        self.run(bars, &series)
    }
}

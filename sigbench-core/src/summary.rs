//! Result summarizer — final metrics plus a sparse signal-change timeline.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{Action, Bar, Signal, SignalSeries, Trade};
use crate::error::{AlignmentError, BacktestError, DataQualityError};
use crate::simulator::{PortfolioSimulator, SimulationConfig, SimulationOutcome};

/// What one backtest task reports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestResult {
    pub final_portfolio_value: f64,
    pub total_return_pct: f64,
    pub benchmark_hold_return_pct: f64,
    /// Bars whose signal differs from the previous bar's.
    pub signal_timeline: BTreeMap<DateTime<Utc>, Signal>,
    pub latest_action: Option<Action>,
    pub trades: Vec<Trade>,
}

impl BacktestResult {
    /// Strategy return minus buy-and-hold return, in percentage points.
    pub fn excess_return_pct(&self) -> f64 {
        self.total_return_pct - self.benchmark_hold_return_pct
    }
}

/// Buy-and-hold return from the first close to the last close.
pub fn benchmark_return_pct(bars: &[Bar]) -> Result<f64, DataQualityError> {
    let (first, last) = match (bars.first(), bars.last()) {
        (Some(f), Some(l)) => (f.close, l.close),
        _ => return Err(DataQualityError::Empty),
    };
    if !(first.is_finite() && first > 0.0) {
        return Err(DataQualityError::NonPositivePrice {
            field: "close",
            index: 0,
            value: first,
        });
    }
    Ok((last - first) / first * 100.0)
}

/// Sparse map of signal changes. The first bar appears only if its signal is
/// not HOLD, so an all-HOLD series yields an empty timeline.
pub fn signal_timeline(
    timestamps: &[DateTime<Utc>],
    signal: &SignalSeries,
) -> Result<BTreeMap<DateTime<Utc>, Signal>, AlignmentError> {
    AlignmentError::check("signal timeline", timestamps.len(), signal.len())?;

    let mut timeline = BTreeMap::new();
    let mut previous = Signal::Hold;
    for (&ts, sig) in timestamps.iter().zip(signal.iter()) {
        if sig != previous {
            timeline.insert(ts, sig);
        }
        previous = sig;
    }
    Ok(timeline)
}

/// Combine a simulation outcome with the bars and signal it ran on.
pub fn summarize(
    bars: &[Bar],
    signal: &SignalSeries,
    outcome: SimulationOutcome,
) -> Result<BacktestResult, BacktestError> {
    let timestamps: Vec<DateTime<Utc>> = bars.iter().map(|b| b.timestamp).collect();
    let signal_timeline = signal_timeline(&timestamps, signal)?;

    Ok(BacktestResult {
        final_portfolio_value: outcome.final_portfolio_value,
        total_return_pct: outcome.total_return_pct,
        benchmark_hold_return_pct: benchmark_return_pct(bars)?,
        signal_timeline,
        latest_action: signal.latest_action(),
        trades: outcome.trades,
    })
}

/// Simulate and summarize in one step.
pub fn backtest(
    bars: &[Bar],
    signal: &SignalSeries,
    config: &SimulationConfig,
) -> Result<BacktestResult, BacktestError> {
    let simulator = PortfolioSimulator::new(config.clone())?;
    let outcome = simulator.run(bars, signal)?;
    summarize(bars, signal, outcome)
}

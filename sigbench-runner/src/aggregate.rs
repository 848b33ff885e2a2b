//! Best-result-per-ticker aggregation.
//!
//! Outcomes arrive in any order. A ticker is complete once it has received as
//! many outcomes (success or failure) as tasks were queued for it; its winner
//! is then final. Ranking is by `total_return_pct`, ties broken by the
//! lexicographically smaller `(indicator, strategy, params)` triple so the
//! winner never depends on completion order. Params compare entry by entry:
//! name first, then value under `f64::total_cmp`.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde::Serialize;
use tracing::info;

use sigbench_core::BacktestResult;

use crate::pool::TaskOutcome;
use crate::task::TaskDescriptor;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BestResult {
    pub ticker: String,
    pub indicator: String,
    pub strategy: String,
    /// Parameter overrides of the winning task; empty means defaults.
    pub params: BTreeMap<String, f64>,
    pub result: BacktestResult,
}

impl BestResult {
    fn beats(&self, other: &BestResult) -> bool {
        match self
            .result
            .total_return_pct
            .total_cmp(&other.result.total_return_pct)
        {
            Ordering::Greater => true,
            Ordering::Less => false,
            Ordering::Equal => {
                (self.indicator.as_str(), self.strategy.as_str())
                    .cmp(&(other.indicator.as_str(), other.strategy.as_str()))
                    .then_with(|| cmp_params(&self.params, &other.params))
                    == Ordering::Less
            }
        }
    }
}

fn cmp_params(a: &BTreeMap<String, f64>, b: &BTreeMap<String, f64>) -> Ordering {
    for ((ka, va), (kb, vb)) in a.iter().zip(b) {
        let ord = ka.cmp(kb).then_with(|| va.total_cmp(vb));
        if ord != Ordering::Equal {
            return ord;
        }
    }
    a.len().cmp(&b.len())
}

/// A ticker whose outcomes have all arrived.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TickerSummary {
    pub ticker: String,
    /// `None` when every task for the ticker failed.
    pub best: Option<BestResult>,
    pub succeeded: usize,
    pub failed: usize,
}

#[derive(Debug, Default)]
struct TickerProgress {
    expected: usize,
    received: usize,
    failed: usize,
    best: Option<BestResult>,
}

#[derive(Debug, Default)]
pub struct Aggregator {
    tickers: BTreeMap<String, TickerProgress>,
}

impl Aggregator {
    /// Expect one outcome per descriptor.
    pub fn new(tasks: &[TaskDescriptor]) -> Self {
        let mut tickers: BTreeMap<String, TickerProgress> = BTreeMap::new();
        for task in tasks {
            tickers.entry(task.ticker.clone()).or_default().expected += 1;
        }
        Self { tickers }
    }

    /// Fold one outcome in. Returns the ticker's summary on the outcome that
    /// completes it, `None` otherwise (including outcomes for unknown tickers
    /// or beyond the expected count).
    pub fn record(&mut self, outcome: &TaskOutcome) -> Option<TickerSummary> {
        let ticker = &outcome.descriptor.ticker;
        let progress = self.tickers.get_mut(ticker)?;
        if progress.received >= progress.expected {
            return None;
        }
        progress.received += 1;

        match &outcome.result {
            Ok(result) => {
                let candidate = BestResult {
                    ticker: ticker.clone(),
                    indicator: outcome.descriptor.indicator.name().to_string(),
                    strategy: outcome.descriptor.strategy.clone(),
                    params: outcome.descriptor.params.clone(),
                    result: result.clone(),
                };
                if progress.best.as_ref().map_or(true, |b| candidate.beats(b)) {
                    progress.best = Some(candidate);
                }
            }
            Err(_) => progress.failed += 1,
        }

        if progress.received < progress.expected {
            return None;
        }

        let summary = TickerSummary {
            ticker: ticker.clone(),
            best: progress.best.clone(),
            succeeded: progress.received - progress.failed,
            failed: progress.failed,
        };
        match &summary.best {
            Some(b) => info!(
                ticker = %summary.ticker,
                indicator = %b.indicator,
                strategy = %b.strategy,
                params = ?b.params,
                return_pct = b.result.total_return_pct,
                "best strategy"
            ),
            None => info!(ticker = %summary.ticker, "every task failed"),
        }
        Some(summary)
    }

    pub fn is_complete(&self) -> bool {
        self.tickers.values().all(|p| p.received >= p.expected)
    }

    /// Tickers still waiting, with how many outcomes are outstanding.
    pub fn pending(&self) -> Vec<(&str, usize)> {
        self.tickers
            .iter()
            .filter(|(_, p)| p.received < p.expected)
            .map(|(t, p)| (t.as_str(), p.expected - p.received))
            .collect()
    }

    /// Current best per ticker, complete or not.
    pub fn snapshot(&self) -> BTreeMap<String, Option<BestResult>> {
        self.tickers
            .iter()
            .map(|(t, p)| (t.clone(), p.best.clone()))
            .collect()
    }
}

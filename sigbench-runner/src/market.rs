//! Loaded bar histories, shared read-only by every task.

use std::collections::BTreeMap;

use sigbench_core::domain::{Bar, Symbol};
use sigbench_core::fingerprint::Fingerprint;

/// One ticker's bars with their fingerprint, computed once at load time.
#[derive(Debug, Clone, PartialEq)]
pub struct TickerBars {
    bars: Vec<Bar>,
    fingerprint: Fingerprint,
}

impl TickerBars {
    pub fn new(bars: Vec<Bar>) -> Self {
        let fingerprint = Fingerprint::of_bars(&bars);
        Self { bars, fingerprint }
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn fingerprint(&self) -> &Fingerprint {
        &self.fingerprint
    }
}

/// Ticker → bars. Ordered so runs iterate tickers deterministically.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MarketData {
    tickers: BTreeMap<Symbol, TickerBars>,
}

impl MarketData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, ticker: impl Into<Symbol>, bars: TickerBars) {
        self.tickers.insert(ticker.into(), bars);
    }

    pub fn get(&self, ticker: &str) -> Option<&TickerBars> {
        self.tickers.get(ticker)
    }

    pub fn tickers(&self) -> impl Iterator<Item = &str> {
        self.tickers.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.tickers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tickers.is_empty()
    }
}

impl FromIterator<(Symbol, Vec<Bar>)> for MarketData {
    fn from_iter<I: IntoIterator<Item = (Symbol, Vec<Bar>)>>(iter: I) -> Self {
        Self {
            tickers: iter
                .into_iter()
                .map(|(t, bars)| (t, TickerBars::new(bars)))
                .collect(),
        }
    }
}

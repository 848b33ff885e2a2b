//! Strategy rules — boolean predicate tables mapping components to a signal.
//!
//! Each indicator kind owns a closed, static table of named rules. A rule is a
//! pair of per-bar predicates. BUY is evaluated first; SELL only fires on bars
//! where BUY does not. Predicates see bars `0..=i` through the slices they are
//! given and must not read past index `i`.

use crate::domain::{Bar, Signal, SignalSeries};

use super::indicator::Components;

/// Per-bar predicate over components and bars.
pub type Predicate = fn(&Components, &[Bar], usize) -> bool;

/// A named strategy: BUY and SELL predicates.
#[derive(Clone, Copy)]
pub struct StrategyRule {
    pub name: &'static str,
    pub buy: Predicate,
    pub sell: Predicate,
}

impl std::fmt::Debug for StrategyRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StrategyRule").field("name", &self.name).finish()
    }
}

impl StrategyRule {
    /// Signal at a single bar.
    pub fn signal_at(&self, components: &Components, bars: &[Bar], i: usize) -> Signal {
        if (self.buy)(components, bars, i) {
            Signal::Buy
        } else if (self.sell)(components, bars, i) {
            Signal::Sell
        } else {
            Signal::Hold
        }
    }

    /// Evaluate the rule over every bar.
    pub fn evaluate(&self, components: &Components, bars: &[Bar]) -> SignalSeries {
        (0..bars.len())
            .map(|i| self.signal_at(components, bars, i))
            .collect()
    }
}

/// `a` crossed above `b` at bar `i`: above now, at or below on the prior bar.
pub fn crossed_above(c: &Components, a: &str, b: &str, i: usize) -> bool {
    i > 0 && c.get(a, i) > c.get(b, i) && c.get(a, i - 1) <= c.get(b, i - 1)
}

/// `a` crossed below `b` at bar `i`.
pub fn crossed_below(c: &Components, a: &str, b: &str, i: usize) -> bool {
    i > 0 && c.get(a, i) < c.get(b, i) && c.get(a, i - 1) >= c.get(b, i - 1)
}

//! Buy-and-hold baseline: BUY on the first bar, nothing afterwards.

use std::collections::BTreeMap;

use crate::components::factory::IndicatorKind;
use crate::components::indicator::{Components, SignalIndicator};
use crate::components::strategy::StrategyRule;
use crate::domain::Bar;

#[derive(Debug, Clone, Copy, Default)]
pub struct Hold;

impl SignalIndicator for Hold {
    fn kind(&self) -> IndicatorKind {
        IndicatorKind::Hold
    }

    fn lookback(&self) -> usize {
        0
    }

    fn params(&self) -> BTreeMap<String, f64> {
        BTreeMap::new()
    }

    fn compute(&self, bars: &[Bar]) -> Components {
        Components::new(bars.len())
    }
}

fn first_bar(_: &Components, _: &[Bar], i: usize) -> bool {
    i == 0
}

fn never(_: &Components, _: &[Bar], _: usize) -> bool {
    false
}

pub static STRATEGIES: &[StrategyRule] = &[StrategyRule {
    name: "Hold",
    buy: first_bar,
    sell: never,
}];

//! Bollinger mean reversion — BUY below the lower band, SELL above the upper.

use std::collections::BTreeMap;

use crate::components::factory::{IndicatorKind, ParamReader};
use crate::components::indicator::{Components, SignalIndicator};
use crate::components::strategy::StrategyRule;
use crate::domain::Bar;
use crate::error::ConfigError;
use crate::indicators::{bollinger, closes};

#[derive(Debug, Clone)]
pub struct Bollinger {
    pub period: usize,
    pub std_multiplier: f64,
}

impl Bollinger {
    pub fn new(period: usize, std_multiplier: f64) -> Self {
        Self {
            period,
            std_multiplier,
        }
    }

    pub fn from_params(p: &mut ParamReader<'_>) -> Result<Self, ConfigError> {
        Ok(Self::new(
            p.period("period", 20)?,
            p.positive("std_multiplier", 2.0)?,
        ))
    }
}

impl Default for Bollinger {
    fn default() -> Self {
        Self::new(20, 2.0)
    }
}

impl SignalIndicator for Bollinger {
    fn kind(&self) -> IndicatorKind {
        IndicatorKind::Bollinger
    }

    fn lookback(&self) -> usize {
        self.period - 1
    }

    fn params(&self) -> BTreeMap<String, f64> {
        BTreeMap::from([
            ("period".to_string(), self.period as f64),
            ("std_multiplier".to_string(), self.std_multiplier),
        ])
    }

    fn compute(&self, bars: &[Bar]) -> Components {
        let bb = bollinger(&closes(bars), self.period, self.std_multiplier);
        Components::new(bars.len())
            .with("bb_upper", bb.upper)
            .with("bb_middle", bb.middle)
            .with("bb_lower", bb.lower)
            .with("bb_bandwidth", bb.bandwidth)
            .with("bb_percent_b", bb.percent_b)
    }
}

fn below_lower(c: &Components, bars: &[Bar], i: usize) -> bool {
    bars[i].close < c.get("bb_lower", i)
}

fn above_upper(c: &Components, bars: &[Bar], i: usize) -> bool {
    bars[i].close > c.get("bb_upper", i)
}

pub static STRATEGIES: &[StrategyRule] = &[StrategyRule {
    name: "Bollinger",
    buy: below_lower,
    sell: above_upper,
}];

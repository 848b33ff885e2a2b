//! Stochastic oscillator crossover — BUY when %K crosses above %D, SELL when
//! it crosses below.

use std::collections::BTreeMap;

use crate::components::factory::{IndicatorKind, ParamReader};
use crate::components::indicator::{Components, SignalIndicator};
use crate::components::strategy::{crossed_above, crossed_below, StrategyRule};
use crate::domain::Bar;
use crate::error::ConfigError;
use crate::indicators::stochastic;

#[derive(Debug, Clone)]
pub struct Stochastic {
    pub k_period: usize,
    pub smooth_k: usize,
    pub d_period: usize,
}

impl Default for Stochastic {
    fn default() -> Self {
        Self {
            k_period: 14,
            smooth_k: 3,
            d_period: 3,
        }
    }
}

impl Stochastic {
    pub fn from_params(p: &mut ParamReader<'_>) -> Result<Self, ConfigError> {
        Ok(Self {
            k_period: p.period("k_period", 14)?,
            smooth_k: p.period("smooth_k", 3)?,
            d_period: p.period("d_period", 3)?,
        })
    }
}

impl SignalIndicator for Stochastic {
    fn kind(&self) -> IndicatorKind {
        IndicatorKind::Stochastic
    }

    fn lookback(&self) -> usize {
        self.k_period
            .saturating_add(self.smooth_k)
            .saturating_add(self.d_period)
            - 3
    }

    fn params(&self) -> BTreeMap<String, f64> {
        BTreeMap::from([
            ("k_period".to_string(), self.k_period as f64),
            ("smooth_k".to_string(), self.smooth_k as f64),
            ("d_period".to_string(), self.d_period as f64),
        ])
    }

    fn compute(&self, bars: &[Bar]) -> Components {
        let st = stochastic(bars, self.k_period, self.smooth_k, self.d_period);
        Components::new(bars.len())
            .with("stoch_k", st.k)
            .with("stoch_d", st.d)
    }
}

fn k_crosses_up(c: &Components, _: &[Bar], i: usize) -> bool {
    crossed_above(c, "stoch_k", "stoch_d", i)
}

fn k_crosses_down(c: &Components, _: &[Bar], i: usize) -> bool {
    crossed_below(c, "stoch_k", "stoch_d", i)
}

pub static STRATEGIES: &[StrategyRule] = &[StrategyRule {
    name: "Stochastic",
    buy: k_crosses_up,
    sell: k_crosses_down,
}];

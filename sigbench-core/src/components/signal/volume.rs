//! Volume surge — BUY when volume exceeds its moving average, SELL when it
//! falls short.

use std::collections::BTreeMap;

use crate::components::factory::{IndicatorKind, ParamReader};
use crate::components::indicator::{Components, SignalIndicator};
use crate::components::strategy::StrategyRule;
use crate::domain::Bar;
use crate::error::ConfigError;
use crate::indicators::sma;

#[derive(Debug, Clone)]
pub struct Volume {
    pub period: usize,
}

impl Default for Volume {
    fn default() -> Self {
        Self { period: 20 }
    }
}

impl Volume {
    pub fn from_params(p: &mut ParamReader<'_>) -> Result<Self, ConfigError> {
        Ok(Self {
            period: p.period("period", 20)?,
        })
    }
}

impl SignalIndicator for Volume {
    fn kind(&self) -> IndicatorKind {
        IndicatorKind::Volume
    }

    fn lookback(&self) -> usize {
        self.period - 1
    }

    fn params(&self) -> BTreeMap<String, f64> {
        BTreeMap::from([("period".to_string(), self.period as f64)])
    }

    fn compute(&self, bars: &[Bar]) -> Components {
        let volume: Vec<f64> = bars.iter().map(|b| b.volume).collect();
        let average = sma(&volume, self.period);
        Components::new(bars.len())
            .with("volume", volume)
            .with("volume_sma", average)
    }
}

fn above_average(c: &Components, _: &[Bar], i: usize) -> bool {
    c.get("volume", i) > c.get("volume_sma", i)
}

fn below_average(c: &Components, _: &[Bar], i: usize) -> bool {
    c.get("volume", i) < c.get("volume_sma", i)
}

pub static STRATEGIES: &[StrategyRule] = &[StrategyRule {
    name: "Volume",
    buy: above_average,
    sell: below_average,
}];

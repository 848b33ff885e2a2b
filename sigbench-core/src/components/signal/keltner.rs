//! Keltner breakout — BUY on a close above the upper channel, SELL on a close
//! below the lower channel.

use std::collections::BTreeMap;

use crate::components::factory::{IndicatorKind, ParamReader};
use crate::components::indicator::{Components, SignalIndicator};
use crate::components::strategy::StrategyRule;
use crate::domain::Bar;
use crate::error::ConfigError;
use crate::indicators::keltner;

#[derive(Debug, Clone)]
pub struct Keltner {
    pub period: usize,
    pub multiplier: f64,
}

impl Keltner {
    pub fn new(period: usize, multiplier: f64) -> Self {
        Self { period, multiplier }
    }

    pub fn from_params(p: &mut ParamReader<'_>) -> Result<Self, ConfigError> {
        Ok(Self::new(p.period("period", 20)?, p.positive("multiplier", 2.0)?))
    }
}

impl Default for Keltner {
    fn default() -> Self {
        Self::new(20, 2.0)
    }
}

impl SignalIndicator for Keltner {
    fn kind(&self) -> IndicatorKind {
        IndicatorKind::Keltner
    }

    fn lookback(&self) -> usize {
        self.period - 1
    }

    fn params(&self) -> BTreeMap<String, f64> {
        BTreeMap::from([
            ("period".to_string(), self.period as f64),
            ("multiplier".to_string(), self.multiplier),
        ])
    }

    fn compute(&self, bars: &[Bar]) -> Components {
        let kc = keltner(bars, self.period, self.multiplier);
        Components::new(bars.len())
            .with("kc_upper", kc.upper)
            .with("kc_middle", kc.middle)
            .with("kc_lower", kc.lower)
    }
}

fn above_upper(c: &Components, bars: &[Bar], i: usize) -> bool {
    bars[i].close > c.get("kc_upper", i)
}

fn below_lower(c: &Components, bars: &[Bar], i: usize) -> bool {
    bars[i].close < c.get("kc_lower", i)
}

pub static STRATEGIES: &[StrategyRule] = &[StrategyRule {
    name: "KC",
    buy: above_upper,
    sell: below_lower,
}];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::signal::test_support::run;
    use crate::domain::Signal;
    use crate::indicators::make_bars;

    #[test]
    fn breakout_above_channel_buys() {
        let mut closes = vec![100.0; 10];
        closes.push(110.0);
        closes.extend([100.0; 3]);
        closes.push(85.0);
        let bars = make_bars(&closes);
        let signals = run(&Keltner::new(5, 1.0), &STRATEGIES[0], &bars);
        assert_eq!(signals[9], Signal::Hold);
        assert_eq!(signals[10], Signal::Buy);
        assert_eq!(signals[14], Signal::Sell);
    }
}

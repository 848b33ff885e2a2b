//! Awesome Oscillator on closes: SMA(fast) - SMA(slow).
//!
//! Strategy `SMA_Crossover`: BUY while the oscillator is positive (fast average
//! above slow), SELL while negative.

use std::collections::BTreeMap;

use crate::components::factory::{IndicatorKind, ParamReader};
use crate::components::indicator::{Components, SignalIndicator};
use crate::components::strategy::StrategyRule;
use crate::domain::Bar;
use crate::error::ConfigError;
use crate::indicators::{closes, sma};

#[derive(Debug, Clone)]
pub struct AwesomeOscillator {
    pub fast_period: usize,
    pub slow_period: usize,
}

impl Default for AwesomeOscillator {
    fn default() -> Self {
        Self {
            fast_period: 5,
            slow_period: 34,
        }
    }
}

impl AwesomeOscillator {
    pub fn from_params(p: &mut ParamReader<'_>) -> Result<Self, ConfigError> {
        let fast_period = p.period("fast_period", 5)?;
        let slow_period = p.period("slow_period", 34)?;
        if fast_period >= slow_period {
            return Err(ConfigError::invalid(
                "fast_period",
                fast_period as f64,
                "must be less than slow_period",
            ));
        }
        Ok(Self {
            fast_period,
            slow_period,
        })
    }
}

impl SignalIndicator for AwesomeOscillator {
    fn kind(&self) -> IndicatorKind {
        IndicatorKind::AwesomeOscillator
    }

    fn lookback(&self) -> usize {
        self.slow_period - 1
    }

    fn params(&self) -> BTreeMap<String, f64> {
        BTreeMap::from([
            ("fast_period".to_string(), self.fast_period as f64),
            ("slow_period".to_string(), self.slow_period as f64),
        ])
    }

    fn compute(&self, bars: &[Bar]) -> Components {
        let closes = closes(bars);
        let fast = sma(&closes, self.fast_period);
        let slow = sma(&closes, self.slow_period);
        let ao = fast.iter().zip(&slow).map(|(f, s)| f - s).collect();
        Components::new(bars.len()).with("ao", ao)
    }
}

fn positive(c: &Components, _: &[Bar], i: usize) -> bool {
    c.get("ao", i) > 0.0
}

fn negative(c: &Components, _: &[Bar], i: usize) -> bool {
    c.get("ao", i) < 0.0
}

pub static STRATEGIES: &[StrategyRule] = &[StrategyRule {
    name: "SMA_Crossover",
    buy: positive,
    sell: negative,
}];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::signal::test_support::run;
    use crate::domain::Signal;
    use crate::indicators::make_bars;

    #[test]
    fn sign_of_oscillator() {
        let ao = AwesomeOscillator {
            fast_period: 2,
            slow_period: 4,
        };
        let bars = make_bars(&[10.0, 10.0, 10.0, 10.0, 14.0, 6.0, 6.0]);
        let signals = run(&ao, &STRATEGIES[0], &bars);
        // flat → zero → hold; jump → fast above; drop → fast below
        assert_eq!(signals[3], Signal::Hold);
        assert_eq!(signals[4], Signal::Buy);
        assert_eq!(signals[6], Signal::Sell);
    }
}

//! MACD — EMA(fast) - EMA(slow), its EMA signal line and the histogram.
//!
//! Strategy `MACD`: BUY while the MACD line is above its signal line, SELL
//! while below.

use std::collections::BTreeMap;

use crate::components::factory::{IndicatorKind, ParamReader};
use crate::components::indicator::{Components, SignalIndicator};
use crate::components::strategy::StrategyRule;
use crate::domain::Bar;
use crate::error::ConfigError;
use crate::indicators::{closes, ema};

#[derive(Debug, Clone)]
pub struct Macd {
    pub fast_period: usize,
    pub slow_period: usize,
    pub signal_period: usize,
}

impl Macd {
    pub fn new(fast_period: usize, slow_period: usize, signal_period: usize) -> Self {
        Self {
            fast_period,
            slow_period,
            signal_period,
        }
    }

    pub fn from_params(p: &mut ParamReader<'_>) -> Result<Self, ConfigError> {
        let fast = p.period("fast_period", 12)?;
        let slow = p.period("slow_period", 26)?;
        let signal = p.period("signal_period", 9)?;
        if fast >= slow {
            return Err(ConfigError::invalid(
                "fast_period",
                fast as f64,
                "must be less than slow_period",
            ));
        }
        Ok(Self::new(fast, slow, signal))
    }
}

impl Default for Macd {
    fn default() -> Self {
        Self::new(12, 26, 9)
    }
}

impl SignalIndicator for Macd {
    fn kind(&self) -> IndicatorKind {
        IndicatorKind::Macd
    }

    fn lookback(&self) -> usize {
        self.slow_period.saturating_add(self.signal_period) - 2
    }

    fn params(&self) -> BTreeMap<String, f64> {
        BTreeMap::from([
            ("fast_period".to_string(), self.fast_period as f64),
            ("slow_period".to_string(), self.slow_period as f64),
            ("signal_period".to_string(), self.signal_period as f64),
        ])
    }

    fn compute(&self, bars: &[Bar]) -> Components {
        let closes = closes(bars);
        let fast = ema(&closes, self.fast_period);
        let slow = ema(&closes, self.slow_period);
        let line: Vec<f64> = fast.iter().zip(&slow).map(|(f, s)| f - s).collect();
        let signal = ema(&line, self.signal_period);
        let hist: Vec<f64> = line.iter().zip(&signal).map(|(l, s)| l - s).collect();

        Components::new(bars.len())
            .with("macd", line)
            .with("macd_signal", signal)
            .with("macd_hist", hist)
    }
}

fn above_signal(c: &Components, _: &[Bar], i: usize) -> bool {
    c.get("macd", i) > c.get("macd_signal", i)
}

fn below_signal(c: &Components, _: &[Bar], i: usize) -> bool {
    c.get("macd", i) < c.get("macd_signal", i)
}

pub static STRATEGIES: &[StrategyRule] = &[StrategyRule {
    name: "MACD",
    buy: above_signal,
    sell: below_signal,
}];

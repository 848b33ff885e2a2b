//! Price versus a single moving average.
//!
//! `ma_type` parameter: 0 = SMA (default), 1 = EMA.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::components::factory::{IndicatorKind, ParamReader};
use crate::components::indicator::{Components, SignalIndicator};
use crate::components::strategy::StrategyRule;
use crate::domain::Bar;
use crate::error::ConfigError;
use crate::indicators::{closes, ema, sma};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MaType {
    Sma,
    Ema,
}

#[derive(Debug, Clone)]
pub struct MovingAverage {
    pub period: usize,
    pub ma_type: MaType,
}

impl MovingAverage {
    pub fn new(period: usize, ma_type: MaType) -> Self {
        Self { period, ma_type }
    }

    pub fn from_params(p: &mut ParamReader<'_>) -> Result<Self, ConfigError> {
        let period = p.period("period", 50)?;
        let ma_type = match p.param("ma_type", 0.0)? {
            v if v == 0.0 => MaType::Sma,
            v if v == 1.0 => MaType::Ema,
            v => return Err(ConfigError::invalid("ma_type", v, "must be 0 (sma) or 1 (ema)")),
        };
        Ok(Self::new(period, ma_type))
    }
}

impl Default for MovingAverage {
    fn default() -> Self {
        Self::new(50, MaType::Sma)
    }
}

impl SignalIndicator for MovingAverage {
    fn kind(&self) -> IndicatorKind {
        IndicatorKind::MovingAverage
    }

    fn lookback(&self) -> usize {
        self.period - 1
    }

    fn params(&self) -> BTreeMap<String, f64> {
        let ma_type = match self.ma_type {
            MaType::Sma => 0.0,
            MaType::Ema => 1.0,
        };
        BTreeMap::from([
            ("period".to_string(), self.period as f64),
            ("ma_type".to_string(), ma_type),
        ])
    }

    fn compute(&self, bars: &[Bar]) -> Components {
        let closes = closes(bars);
        let ma = match self.ma_type {
            MaType::Sma => sma(&closes, self.period),
            MaType::Ema => ema(&closes, self.period),
        };
        Components::new(bars.len()).with("ma", ma)
    }
}

fn close_above(c: &Components, bars: &[Bar], i: usize) -> bool {
    bars[i].close > c.get("ma", i)
}

fn close_below(c: &Components, bars: &[Bar], i: usize) -> bool {
    bars[i].close < c.get("ma", i)
}

pub static STRATEGIES: &[StrategyRule] = &[StrategyRule {
    name: "MA",
    buy: close_above,
    sell: close_below,
}];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::signal::test_support::run;
    use crate::domain::Signal;
    use crate::indicators::make_bars;

    #[test]
    fn trend_side_of_average() {
        let bars = make_bars(&[10.0, 10.0, 10.0, 13.0, 7.0]);
        for ma_type in [MaType::Sma, MaType::Ema] {
            let signals = run(&MovingAverage::new(3, ma_type), &STRATEGIES[0], &bars);
            assert_eq!(
                signals,
                vec![Signal::Hold, Signal::Hold, Signal::Hold, Signal::Buy, Signal::Sell],
                "{ma_type:?}"
            );
        }
    }

    #[test]
    fn ma_type_param_is_closed() {
        let params = BTreeMap::from([("ma_type".to_string(), 2.0)]);
        assert!(MovingAverage::from_params(&mut ParamReader::new(&params)).is_err());
        let params = BTreeMap::from([("ma_type".to_string(), 1.0)]);
        let ma = MovingAverage::from_params(&mut ParamReader::new(&params)).unwrap();
        assert_eq!(ma.ma_type, MaType::Ema);
    }
}

//! RSI family — overbought/oversold, persistence, divergence and fast/slow cross.
//!
//! Components:
//! - `rsi_slow`: RSI(slow_period), default 14
//! - `rsi_fast`: RSI(fast_period), default 5
//! - `bullish_divergence`: 1.0 where low makes a lower low while slow RSI rises
//! - `bearish_divergence`: 1.0 where high makes a higher high while slow RSI falls

use std::collections::BTreeMap;

use crate::components::factory::{IndicatorKind, ParamReader};
use crate::components::indicator::{Components, SignalIndicator};
use crate::components::strategy::{crossed_above, crossed_below, StrategyRule};
use crate::domain::Bar;
use crate::error::ConfigError;
use crate::indicators::{closes, rsi};

pub const OVERSOLD: f64 = 30.0;
pub const OVERBOUGHT: f64 = 70.0;

#[derive(Debug, Clone)]
pub struct Rsi {
    pub slow_period: usize,
    pub fast_period: usize,
}

impl Rsi {
    pub fn new(slow_period: usize, fast_period: usize) -> Self {
        Self {
            slow_period,
            fast_period,
        }
    }

    pub fn from_params(p: &mut ParamReader<'_>) -> Result<Self, ConfigError> {
        Ok(Self::new(p.period("slow_period", 14)?, p.period("fast_period", 5)?))
    }
}

impl Default for Rsi {
    fn default() -> Self {
        Self::new(14, 5)
    }
}

impl SignalIndicator for Rsi {
    fn kind(&self) -> IndicatorKind {
        IndicatorKind::Rsi
    }

    fn lookback(&self) -> usize {
        self.slow_period.max(self.fast_period)
    }

    fn params(&self) -> BTreeMap<String, f64> {
        BTreeMap::from([
            ("slow_period".to_string(), self.slow_period as f64),
            ("fast_period".to_string(), self.fast_period as f64),
        ])
    }

    fn compute(&self, bars: &[Bar]) -> Components {
        let closes = closes(bars);
        let slow = rsi(&closes, self.slow_period);
        let fast = rsi(&closes, self.fast_period);

        let n = bars.len();
        let mut bullish = vec![0.0; n];
        let mut bearish = vec![0.0; n];
        for i in 1..n {
            if bars[i].low < bars[i - 1].low && slow[i] > slow[i - 1] {
                bullish[i] = 1.0;
            }
            if bars[i].high > bars[i - 1].high && slow[i] < slow[i - 1] {
                bearish[i] = 1.0;
            }
        }

        Components::new(n)
            .with("rsi_slow", slow)
            .with("rsi_fast", fast)
            .with("bullish_divergence", bullish)
            .with("bearish_divergence", bearish)
    }
}

fn oversold(c: &Components, _: &[Bar], i: usize) -> bool {
    c.get("rsi_slow", i) < OVERSOLD
}

fn overbought(c: &Components, _: &[Bar], i: usize) -> bool {
    c.get("rsi_slow", i) > OVERBOUGHT
}

/// Overbought on this bar and at or above the threshold on the previous one.
fn overbought_persisting(c: &Components, bars: &[Bar], i: usize) -> bool {
    c.get_lagged("rsi_slow", i, 1) >= OVERBOUGHT && overbought(c, bars, i)
}

fn bullish_divergence(c: &Components, bars: &[Bar], i: usize) -> bool {
    c.get("bullish_divergence", i) == 1.0 && oversold(c, bars, i)
}

fn bearish_divergence(c: &Components, bars: &[Bar], i: usize) -> bool {
    c.get("bearish_divergence", i) == 1.0 && overbought(c, bars, i)
}

fn fast_crosses_up(c: &Components, _: &[Bar], i: usize) -> bool {
    crossed_above(c, "rsi_fast", "rsi_slow", i)
}

fn fast_crosses_down(c: &Components, _: &[Bar], i: usize) -> bool {
    crossed_below(c, "rsi_fast", "rsi_slow", i)
}

pub static STRATEGIES: &[StrategyRule] = &[
    StrategyRule {
        name: "RSI",
        buy: oversold,
        sell: overbought,
    },
    StrategyRule {
        name: "RSI_Falling",
        buy: oversold,
        sell: overbought_persisting,
    },
    StrategyRule {
        name: "RSI_Divergence",
        buy: bullish_divergence,
        sell: bearish_divergence,
    },
    StrategyRule {
        name: "RSI_Cross",
        buy: fast_crosses_up,
        sell: fast_crosses_down,
    },
];

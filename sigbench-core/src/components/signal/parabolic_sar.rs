//! Parabolic SAR — BUY while close sits above the long leg, SELL while close
//! sits below the short leg.

use std::collections::BTreeMap;

use crate::components::factory::{IndicatorKind, ParamReader};
use crate::components::indicator::{Components, SignalIndicator};
use crate::components::strategy::StrategyRule;
use crate::domain::Bar;
use crate::error::ConfigError;
use crate::indicators::{parabolic_sar, PsarParams};

#[derive(Debug, Clone, Default)]
pub struct Psar {
    pub params: PsarParams,
}

impl Psar {
    pub fn new(params: PsarParams) -> Self {
        Self { params }
    }

    pub fn from_params(p: &mut ParamReader<'_>) -> Result<Self, ConfigError> {
        Ok(Self::new(read_psar_params(p)?))
    }
}

/// Shared with Ichimoku's `TenkanKijunPSAR` strategy.
pub(crate) fn read_psar_params(p: &mut ParamReader<'_>) -> Result<PsarParams, ConfigError> {
    let d = PsarParams::default();
    let af_start = p.positive("af_start", d.af_start)?;
    let af_step = p.positive("af_step", d.af_step)?;
    let af_max = p.positive("af_max", d.af_max)?;
    if af_max < af_start {
        return Err(ConfigError::invalid("af_max", af_max, "must be >= af_start"));
    }
    Ok(PsarParams {
        af_start,
        af_step,
        af_max,
    })
}

pub(crate) fn psar_param_map(p: &PsarParams) -> [(String, f64); 3] {
    [
        ("af_start".to_string(), p.af_start),
        ("af_step".to_string(), p.af_step),
        ("af_max".to_string(), p.af_max),
    ]
}

impl SignalIndicator for Psar {
    fn kind(&self) -> IndicatorKind {
        IndicatorKind::Psar
    }

    fn lookback(&self) -> usize {
        1
    }

    fn params(&self) -> BTreeMap<String, f64> {
        psar_param_map(&self.params).into_iter().collect()
    }

    fn compute(&self, bars: &[Bar]) -> Components {
        let psar = parabolic_sar(bars, self.params);
        Components::new(bars.len())
            .with("psar", psar.sar)
            .with("psar_long", psar.long)
            .with("psar_short", psar.short)
    }
}

fn above_long_leg(c: &Components, bars: &[Bar], i: usize) -> bool {
    bars[i].close > c.get("psar_long", i)
}

fn below_short_leg(c: &Components, bars: &[Bar], i: usize) -> bool {
    bars[i].close < c.get("psar_short", i)
}

pub static STRATEGIES: &[StrategyRule] = &[StrategyRule {
    name: "PSAR",
    buy: above_long_leg,
    sell: below_short_leg,
}];

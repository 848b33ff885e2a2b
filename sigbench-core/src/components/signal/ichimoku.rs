//! Ichimoku Kinko Hyo.
//!
//! Components:
//! - `tenkan`: midprice(tenkan_period), default 9
//! - `kijun`: midprice(kijun_period), default 26
//! - `senkou_a`: (tenkan + kijun) / 2, displaced forward by `displacement` (26)
//! - `senkou_b`: midprice(senkou_b_period = 52), displaced forward likewise
//! - `lagging_reference`: close displaced forward by `displacement`
//! - `psar_long` / `psar_short`: Parabolic SAR legs for `TenkanKijunPSAR`
//!
//! The lagging span compares today's close against the close `displacement`
//! bars ago, which reads only past data. Plotting it shifted backwards would
//! read the future and is never done here.

use std::collections::BTreeMap;

use crate::components::factory::{IndicatorKind, ParamReader};
use crate::components::indicator::{Components, SignalIndicator};
use crate::components::strategy::StrategyRule;
use crate::domain::Bar;
use crate::error::ConfigError;
use crate::indicators::{closes, midprice, parabolic_sar, shift, PsarParams};

use super::parabolic_sar::{psar_param_map, read_psar_params};

#[derive(Debug, Clone)]
pub struct Ichimoku {
    pub tenkan_period: usize,
    pub kijun_period: usize,
    pub senkou_b_period: usize,
    pub displacement: usize,
    pub psar: PsarParams,
}

impl Default for Ichimoku {
    fn default() -> Self {
        Self {
            tenkan_period: 9,
            kijun_period: 26,
            senkou_b_period: 52,
            displacement: 26,
            psar: PsarParams::default(),
        }
    }
}

impl Ichimoku {
    pub fn from_params(p: &mut ParamReader<'_>) -> Result<Self, ConfigError> {
        Ok(Self {
            tenkan_period: p.period("tenkan_period", 9)?,
            kijun_period: p.period("kijun_period", 26)?,
            senkou_b_period: p.period("senkou_b_period", 52)?,
            displacement: p.period("displacement", 26)?,
            psar: read_psar_params(p)?,
        })
    }
}

impl SignalIndicator for Ichimoku {
    fn kind(&self) -> IndicatorKind {
        IndicatorKind::Ichimoku
    }

    fn lookback(&self) -> usize {
        self.senkou_b_period
            .max(self.kijun_period)
            .max(self.tenkan_period)
            .saturating_add(self.displacement)
            - 1
    }

    fn params(&self) -> BTreeMap<String, f64> {
        let mut m: BTreeMap<String, f64> = psar_param_map(&self.psar).into_iter().collect();
        m.insert("tenkan_period".into(), self.tenkan_period as f64);
        m.insert("kijun_period".into(), self.kijun_period as f64);
        m.insert("senkou_b_period".into(), self.senkou_b_period as f64);
        m.insert("displacement".into(), self.displacement as f64);
        m
    }

    fn compute(&self, bars: &[Bar]) -> Components {
        let tenkan = midprice(bars, self.tenkan_period);
        let kijun = midprice(bars, self.kijun_period);
        let span_a: Vec<f64> = tenkan.iter().zip(&kijun).map(|(t, k)| (t + k) / 2.0).collect();
        let span_b = midprice(bars, self.senkou_b_period);
        let psar = parabolic_sar(bars, self.psar);

        Components::new(bars.len())
            .with("senkou_a", shift(&span_a, self.displacement))
            .with("senkou_b", shift(&span_b, self.displacement))
            .with("lagging_reference", shift(&closes(bars), self.displacement))
            .with("tenkan", tenkan)
            .with("kijun", kijun)
            .with("psar_long", psar.long)
            .with("psar_short", psar.short)
    }
}

fn tenkan_above_kijun(c: &Components, i: usize) -> bool {
    c.get("tenkan", i) > c.get("kijun", i)
}

fn tenkan_below_kijun(c: &Components, i: usize) -> bool {
    c.get("tenkan", i) < c.get("kijun", i)
}

fn above_cloud(c: &Components, bars: &[Bar], i: usize) -> bool {
    let close = bars[i].close;
    close > c.get("senkou_a", i) && close > c.get("senkou_b", i)
}

fn below_cloud(c: &Components, bars: &[Bar], i: usize) -> bool {
    let close = bars[i].close;
    close < c.get("senkou_a", i) && close < c.get("senkou_b", i)
}

/// Below span A while still above span B.
fn under_span_a_over_span_b(c: &Components, bars: &[Bar], i: usize) -> bool {
    let close = bars[i].close;
    close < c.get("senkou_a", i) && close > c.get("senkou_b", i)
}

fn ichimoku_buy(c: &Components, bars: &[Bar], i: usize) -> bool {
    tenkan_above_kijun(c, i) && above_cloud(c, bars, i)
}

fn ichimoku_sell(c: &Components, bars: &[Bar], i: usize) -> bool {
    tenkan_below_kijun(c, i) && below_cloud(c, bars, i)
}

fn kumo_chikou_buy(c: &Components, bars: &[Bar], i: usize) -> bool {
    above_cloud(c, bars, i) && bars[i].close > c.get("lagging_reference", i)
}

fn kumo_chikou_sell(c: &Components, bars: &[Bar], i: usize) -> bool {
    under_span_a_over_span_b(c, bars, i) && bars[i].close < c.get("lagging_reference", i)
}

fn tk_buy(c: &Components, _: &[Bar], i: usize) -> bool {
    tenkan_above_kijun(c, i)
}

fn tk_sell(c: &Components, _: &[Bar], i: usize) -> bool {
    tenkan_below_kijun(c, i)
}

fn tk_psar_buy(c: &Components, bars: &[Bar], i: usize) -> bool {
    tenkan_above_kijun(c, i) && bars[i].close > c.get("psar_long", i)
}

fn tk_psar_sell(c: &Components, bars: &[Bar], i: usize) -> bool {
    tenkan_below_kijun(c, i) && bars[i].close < c.get("psar_short", i)
}

pub static STRATEGIES: &[StrategyRule] = &[
    StrategyRule {
        name: "Ichimoku",
        buy: ichimoku_buy,
        sell: ichimoku_sell,
    },
    StrategyRule {
        name: "Kumo",
        buy: above_cloud,
        sell: under_span_a_over_span_b,
    },
    StrategyRule {
        name: "KumoChikou",
        buy: kumo_chikou_buy,
        sell: kumo_chikou_sell,
    },
    StrategyRule {
        name: "TenkanKijun",
        buy: tk_buy,
        sell: tk_sell,
    },
    StrategyRule {
        name: "TenkanKijunPSAR",
        buy: tk_psar_buy,
        sell: tk_psar_sell,
    },
];

//! Stochastic oscillator.
//!
//! raw %K = 100 * (close - lowest low) / (highest high - lowest low) over `k_period`
//! %K = SMA(raw %K, smooth_k), %D = SMA(%K, d_period)
//! Lookback: k_period + smooth_k + d_period - 3.

use super::donchian::{rolling_max, rolling_min};
use super::sma::sma;
use crate::domain::Bar;

#[derive(Debug, Clone, PartialEq)]
pub struct StochasticSeries {
    pub k: Vec<f64>,
    pub d: Vec<f64>,
}

pub fn stochastic(
    bars: &[Bar],
    k_period: usize,
    smooth_k: usize,
    d_period: usize,
) -> StochasticSeries {
    let highs: Vec<f64> = bars.iter().map(|b| b.high).collect();
    let lows: Vec<f64> = bars.iter().map(|b| b.low).collect();
    let hh = rolling_max(&highs, k_period);
    let ll = rolling_min(&lows, k_period);

    let raw: Vec<f64> = bars
        .iter()
        .enumerate()
        .map(|(i, bar)| {
            let range = hh[i] - ll[i];
            if range > 0.0 {
                100.0 * (bar.close - ll[i]) / range
            } else if range == 0.0 {
                50.0
            } else {
                f64::NAN
            }
        })
        .collect();

    let k = sma(&raw, smooth_k);
    let d = sma(&k, d_period);
    StochasticSeries { k, d }
}

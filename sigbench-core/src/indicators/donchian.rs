//! Rolling extremes (Donchian channel) and midprice.
//!
//! Lookback: period - 1. A NaN inside a window yields NaN.

use crate::domain::Bar;

fn rolling(values: &[f64], period: usize, pick: fn(f64, f64) -> f64) -> Vec<f64> {
    let n = values.len();
    let mut result = vec![f64::NAN; n];
    if period == 0 || n < period {
        return result;
    }
    for i in (period - 1)..n {
        let window = &values[i + 1 - period..=i];
        if window.iter().any(|v| v.is_nan()) {
            continue;
        }
        result[i] = window.iter().copied().fold(window[0], pick);
    }
    result
}

/// Highest value over the trailing `period` elements (inclusive).
pub fn rolling_max(values: &[f64], period: usize) -> Vec<f64> {
    rolling(values, period, f64::max)
}

/// Lowest value over the trailing `period` elements (inclusive).
pub fn rolling_min(values: &[f64], period: usize) -> Vec<f64> {
    rolling(values, period, f64::min)
}

/// (highest high + lowest low) / 2 over the trailing window.
pub fn midprice(bars: &[Bar], period: usize) -> Vec<f64> {
    let highs: Vec<f64> = bars.iter().map(|b| b.high).collect();
    let lows: Vec<f64> = bars.iter().map(|b| b.low).collect();
    rolling_max(&highs, period)
        .into_iter()
        .zip(rolling_min(&lows, period))
        .map(|(h, l)| (h + l) / 2.0)
        .collect()
}

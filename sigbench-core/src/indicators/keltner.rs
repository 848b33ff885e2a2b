//! Keltner Channels — EMA basis with a true-range envelope.
//!
//! - Middle: EMA(close, period)
//! - Band: EMA(true range, period)
//! - Upper/Lower: middle ± mult * band
//!
//! Lookback: period - 1.

use super::atr::true_range;
use super::ema::ema;
use crate::domain::Bar;

#[derive(Debug, Clone, PartialEq)]
pub struct KeltnerSeries {
    pub upper: Vec<f64>,
    pub middle: Vec<f64>,
    pub lower: Vec<f64>,
}

pub fn keltner(bars: &[Bar], period: usize, multiplier: f64) -> KeltnerSeries {
    let closes = super::closes(bars);
    let middle = ema(&closes, period);
    let band = ema(&true_range(bars), period);

    let (upper, lower) = middle
        .iter()
        .zip(&band)
        .map(|(&m, &b)| (m + multiplier * b, m - multiplier * b))
        .unzip();

    KeltnerSeries {
        upper,
        middle,
        lower,
    }
}

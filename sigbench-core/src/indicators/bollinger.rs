//! Bollinger Bands — moving average +/- standard deviation multiplier.
//!
//! - Middle: SMA(close, period)
//! - Upper/Lower: middle ± mult * stddev(close, period)
//! - Bandwidth: (upper - lower) / middle * 100
//! - %B: (close - lower) / (upper - lower)
//!
//! Uses population stddev (divide by N).
//! Lookback: period - 1.

use super::sma::sma;

#[derive(Debug, Clone, PartialEq)]
pub struct BollingerSeries {
    pub upper: Vec<f64>,
    pub middle: Vec<f64>,
    pub lower: Vec<f64>,
    pub bandwidth: Vec<f64>,
    pub percent_b: Vec<f64>,
}

pub fn bollinger(closes: &[f64], period: usize, multiplier: f64) -> BollingerSeries {
    let n = closes.len();
    let middle = sma(closes, period);
    let mut upper = vec![f64::NAN; n];
    let mut lower = vec![f64::NAN; n];
    let mut bandwidth = vec![f64::NAN; n];
    let mut percent_b = vec![f64::NAN; n];

    for i in 0..n {
        let mean = middle[i];
        if mean.is_nan() {
            continue;
        }
        let window = &closes[i + 1 - period..=i];
        let variance =
            window.iter().map(|c| (c - mean) * (c - mean)).sum::<f64>() / period as f64;
        let width = multiplier * variance.sqrt();
        upper[i] = mean + width;
        lower[i] = mean - width;
        if mean != 0.0 {
            bandwidth[i] = (upper[i] - lower[i]) / mean * 100.0;
        }
        if upper[i] > lower[i] {
            percent_b[i] = (closes[i] - lower[i]) / (upper[i] - lower[i]);
        }
    }

    BollingerSeries {
        upper,
        middle,
        lower,
        bandwidth,
        percent_b,
    }
}

//! Indicator kernels.
//!
//! Pure functions over price slices. Every kernel returns one value per input
//! element and fills its warmup window with NaN; a NaN inside a window
//! propagates to the outputs that depend on it. Signal providers compose these
//! into named component series.

pub mod atr;
pub mod bollinger;
pub mod donchian;
pub mod ema;
pub mod keltner;
pub mod parabolic_sar;
pub mod rsi;
pub mod sma;
pub mod stochastic;

pub use atr::true_range;
pub use bollinger::{bollinger, BollingerSeries};
pub use donchian::{midprice, rolling_max, rolling_min};
pub use ema::ema;
pub use keltner::{keltner, KeltnerSeries};
pub use parabolic_sar::{parabolic_sar, PsarParams, PsarSeries};
pub use rsi::rsi;
pub use sma::sma;
pub use stochastic::{stochastic, StochasticSeries};

/// Close prices of a bar slice.
pub fn closes(bars: &[crate::domain::Bar]) -> Vec<f64> {
    bars.iter().map(|b| b.close).collect()
}

/// Displace a series `lag` elements forward: `out[t] = values[t - lag]`.
/// The first `lag` entries are NaN.
pub fn shift(values: &[f64], lag: usize) -> Vec<f64> {
    let n = values.len();
    let mut out = vec![f64::NAN; n];
    for i in lag..n {
        out[i] = values[i - lag];
    }
    out
}

/// Create synthetic bars from close prices for testing.
///
/// Generates plausible OHLV: open = prev_close (or close for first bar),
/// high = max(open,close) + 1.0, low = min(open,close) - 1.0, volume = 1000.
/// Bars are one day apart starting 2024-01-02.
#[cfg(test)]
pub fn make_bars(closes: &[f64]) -> Vec<crate::domain::Bar> {
    use crate::domain::Bar;
    use chrono::TimeZone;
    let base = chrono::Utc
        .with_ymd_and_hms(2024, 1, 2, 0, 0, 0)
        .single()
        .unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = if i == 0 { close } else { closes[i - 1] };
            Bar {
                timestamp: base + chrono::Duration::days(i as i64),
                open,
                high: open.max(close) + 1.0,
                low: open.min(close) - 1.0,
                close,
                volume: 1000.0,
            }
        })
        .collect()
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for indicator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;

//! True range.
//!
//! True Range: max(high-low, |high-prev_close|, |low-prev_close|); TR[0] = high-low.

use crate::domain::Bar;

/// Compute the True Range series from bars.
pub fn true_range(bars: &[Bar]) -> Vec<f64> {
    bars.iter()
        .enumerate()
        .map(|(i, bar)| {
            let hl = bar.high - bar.low;
            match i.checked_sub(1).map(|p| bars[p].close) {
                None => hl,
                Some(pc) if pc.is_nan() => f64::NAN,
                Some(pc) => hl.max((bar.high - pc).abs()).max((bar.low - pc).abs()),
            }
        })
        .collect()
}

//! Exponential Moving Average (EMA).
//!
//! Recursive: EMA[t] = alpha * x[t] + (1 - alpha) * EMA[t-1], alpha = 2 / (period + 1).
//! Seed: SMA of the first `period` values after any leading NaN run, so the
//! kernel can be chained onto another indicator's output (MACD signal line).

/// EMA of an arbitrary series.
///
/// Leading NaN values are skipped. A NaN after the seed poisons the rest of
/// the output; recursive kernels never fill gaps.
pub fn ema(values: &[f64], period: usize) -> Vec<f64> {
    smooth(values, period, 2.0 / (period as f64 + 1.0))
}

/// Recursive smoother seeded by the mean of the first `period` values.
fn smooth(values: &[f64], period: usize, alpha: f64) -> Vec<f64> {
    let n = values.len();
    let mut result = vec![f64::NAN; n];

    if period == 0 {
        return result;
    }

    let Some(start) = values.iter().position(|v| !v.is_nan()) else {
        return result;
    };
    let Some(seed_end) = start.checked_add(period).filter(|&end| end <= n) else {
        return result;
    };

    let window = &values[start..seed_end];
    if window.iter().any(|v| v.is_nan()) {
        return result;
    }
    let mut prev = window.iter().sum::<f64>() / period as f64;
    result[seed_end - 1] = prev;

    for i in seed_end..n {
        if values[i].is_nan() {
            return result;
        }
        prev = alpha * values[i] + (1.0 - alpha) * prev;
        result[i] = prev;
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, DEFAULT_EPSILON};

    #[test]
    fn ema_period_1_equals_input() {
        let result = ema(&[100.0, 200.0, 300.0], 1);
        assert_approx(result[0], 100.0, DEFAULT_EPSILON);
        assert_approx(result[1], 200.0, DEFAULT_EPSILON);
        assert_approx(result[2], 300.0, DEFAULT_EPSILON);
    }

    #[test]
    fn ema_3_hand_computed() {
        // seed = mean(2,4,6) = 4; alpha = 0.5
        // ema[3] = 0.5*8 + 0.5*4 = 6; ema[4] = 0.5*10 + 0.5*6 = 8
        let result = ema(&[2.0, 4.0, 6.0, 8.0, 10.0], 3);
        assert!(result[0].is_nan() && result[1].is_nan());
        assert_approx(result[2], 4.0, DEFAULT_EPSILON);
        assert_approx(result[3], 6.0, DEFAULT_EPSILON);
        assert_approx(result[4], 8.0, DEFAULT_EPSILON);
    }

    #[test]
    fn ema_skips_leading_nan() {
        let result = ema(&[f64::NAN, f64::NAN, 2.0, 4.0, 6.0], 2);
        assert!(result[2].is_nan());
        assert_approx(result[3], 3.0, DEFAULT_EPSILON);
        // alpha = 2/3: 2/3*6 + 1/3*3 = 5
        assert_approx(result[4], 5.0, DEFAULT_EPSILON);
    }

    #[test]
    fn ema_huge_period_after_leading_nan_is_all_nan() {
        let result = ema(&[f64::NAN, 1.0, 2.0], usize::MAX);
        assert!(result.iter().all(|v| v.is_nan()));
    }

    #[test]
    fn ema_nan_after_seed_poisons_tail() {
        let result = ema(&[1.0, 2.0, 3.0, f64::NAN, 5.0], 2);
        assert!(!result[2].is_nan());
        assert!(result[3].is_nan());
        assert!(result[4].is_nan());
    }

    #[test]
    fn ema_constant_series_is_constant() {
        let result = ema(&[7.0; 30], 10);
        for v in &result[9..] {
            assert_approx(*v, 7.0, DEFAULT_EPSILON);
        }
    }
}

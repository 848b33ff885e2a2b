//! Bar — the fundamental market data unit.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DataQualityError;

/// OHLCV observation for one instrument at one point in time.
///
/// A series of bars is ordered ascending by `timestamp` with no duplicates and
/// is never mutated once loaded; every consumer takes `&[Bar]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Bar {
    /// Name of the first OHLCV field that is NaN or infinite.
    pub fn non_finite_field(&self) -> Option<&'static str> {
        [
            ("open", self.open),
            ("high", self.high),
            ("low", self.low),
            ("close", self.close),
            ("volume", self.volume),
        ]
        .into_iter()
        .find(|(_, v)| !v.is_finite())
        .map(|(name, _)| name)
    }

    /// The range brackets open and close, and volume is not negative.
    pub fn is_consistent(&self) -> bool {
        self.high >= self.low
            && self.high >= self.open.max(self.close)
            && self.low <= self.open.min(self.close)
            && self.volume >= 0.0
    }
}

/// Check the ordering precondition: timestamps strictly ascending.
pub fn check_ordering(bars: &[Bar]) -> Result<(), DataQualityError> {
    match bars
        .windows(2)
        .position(|w| w[1].timestamp <= w[0].timestamp)
    {
        Some(i) => Err(DataQualityError::Unordered { index: i + 1 }),
        None => Ok(()),
    }
}

/// Index of the first bar no more than `days` calendar days older than the
/// last bar. Expects ordered bars; an empty series gives 0.
pub fn trailing_window_start(bars: &[Bar], days: u32) -> usize {
    let Some(last) = bars.last() else {
        return 0;
    };
    let cutoff = last.timestamp - Duration::days(i64::from(days));
    bars.partition_point(|b| b.timestamp < cutoff)
}

/// Full validation for a series about to be simulated: non-empty, ordered,
/// every field finite, open and close strictly positive, and each bar's
/// range consistent with its open and close.
pub fn validate_series(bars: &[Bar]) -> Result<(), DataQualityError> {
    if bars.is_empty() {
        return Err(DataQualityError::Empty);
    }
    check_ordering(bars)?;
    for (index, bar) in bars.iter().enumerate() {
        if let Some(field) = bar.non_finite_field() {
            return Err(DataQualityError::NonFinite { field, index });
        }
        for (field, value) in [("open", bar.open), ("close", bar.close)] {
            if value <= 0.0 {
                return Err(DataQualityError::NonPositivePrice {
                    field,
                    index,
                    value,
                });
            }
        }
        if !bar.is_consistent() {
            return Err(DataQualityError::InconsistentBar { index });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_bar() -> Bar {
        Bar {
            timestamp: Utc.with_ymd_and_hms(2024, 1, 2, 14, 30, 0).unwrap(),
            open: 100.0,
            high: 105.0,
            low: 98.0,
            close: 103.0,
            volume: 50_000.0,
        }
    }

    fn series(n: usize) -> Vec<Bar> {
        let base = sample_bar();
        (0..n)
            .map(|i| Bar {
                timestamp: base.timestamp + Duration::hours(i as i64),
                ..base.clone()
            })
            .collect()
    }

    #[test]
    fn sample_bar_is_consistent() {
        assert!(sample_bar().is_consistent());
    }

    #[test]
    fn high_below_low_is_inconsistent() {
        let mut bar = sample_bar();
        bar.high = 97.0;
        assert!(!bar.is_consistent());
    }

    #[test]
    fn close_outside_range_is_inconsistent() {
        let mut bar = sample_bar();
        bar.close = 106.0;
        assert!(!bar.is_consistent());
    }

    #[test]
    fn non_finite_field_names_field() {
        let mut bar = sample_bar();
        bar.low = f64::INFINITY;
        assert_eq!(bar.non_finite_field(), Some("low"));
        let mut bar = sample_bar();
        bar.volume = f64::NAN;
        assert_eq!(bar.non_finite_field(), Some("volume"));
    }

    #[test]
    fn trailing_window_keeps_last_days() {
        // hourly bars: 48 bars span two days
        let bars = series(48);
        assert_eq!(trailing_window_start(&bars, 1), 23);
        assert_eq!(trailing_window_start(&bars, 30), 0);
        assert_eq!(trailing_window_start(&[], 5), 0);
    }

    #[test]
    fn trailing_window_on_daily_bars_includes_boundary() {
        let base = sample_bar();
        let bars: Vec<Bar> = (0..10)
            .map(|i| Bar {
                timestamp: base.timestamp + Duration::days(i),
                ..base.clone()
            })
            .collect();
        // last bar is day 9; cutoff day 6 is kept
        assert_eq!(trailing_window_start(&bars, 3), 6);
        assert_eq!(trailing_window_start(&bars, 0), 9);
    }

    #[test]
    fn validate_rejects_empty() {
        assert_eq!(validate_series(&[]), Err(DataQualityError::Empty));
    }

    #[test]
    fn validate_rejects_duplicate_timestamp() {
        let mut bars = series(3);
        bars[2].timestamp = bars[1].timestamp;
        assert_eq!(
            validate_series(&bars),
            Err(DataQualityError::Unordered { index: 2 })
        );
    }

    #[test]
    fn validate_rejects_nan_close() {
        let mut bars = series(4);
        bars[3].close = f64::NAN;
        assert_eq!(
            validate_series(&bars),
            Err(DataQualityError::NonFinite {
                field: "close",
                index: 3
            })
        );
    }

    #[test]
    fn validate_rejects_zero_open() {
        let mut bars = series(2);
        bars[1].open = 0.0;
        assert!(matches!(
            validate_series(&bars),
            Err(DataQualityError::NonPositivePrice { field: "open", index: 1, .. })
        ));
    }

    #[test]
    fn validate_rejects_inverted_range() {
        let mut bars = series(3);
        bars[1].high = 97.0;
        assert_eq!(
            validate_series(&bars),
            Err(DataQualityError::InconsistentBar { index: 1 })
        );
    }

    #[test]
    fn validate_rejects_nan_volume() {
        let mut bars = series(3);
        bars[2].volume = f64::NAN;
        assert_eq!(
            validate_series(&bars),
            Err(DataQualityError::NonFinite {
                field: "volume",
                index: 2
            })
        );
    }

    #[test]
    fn validate_rejects_negative_volume() {
        let mut bars = series(2);
        bars[0].volume = -1.0;
        assert_eq!(
            validate_series(&bars),
            Err(DataQualityError::InconsistentBar { index: 0 })
        );
    }

    #[test]
    fn validate_accepts_clean_series() {
        assert!(validate_series(&series(5)).is_ok());
    }

    #[test]
    fn bar_serialization_roundtrip() {
        let bar = sample_bar();
        let json = serde_json::to_string(&bar).unwrap();
        let deser: Bar = serde_json::from_str(&json).unwrap();
        assert_eq!(bar, deser);
    }
}

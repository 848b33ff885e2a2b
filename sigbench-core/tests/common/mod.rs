//! Shared fixtures for sigbench-core integration tests.

#![allow(dead_code)]

use chrono::{Duration, TimeZone, Utc};
use sigbench_core::domain::{Bar, Signal, SignalSeries};

/// Daily bars from 2024-01-02 with the given closes. Each open is the
/// previous close, the range brackets open and close by 1.
pub fn bars_from_closes(closes: &[f64]) -> Vec<Bar> {
    let base = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
    let mut prev = closes.first().copied().unwrap_or(100.0);
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = prev;
            prev = close;
            Bar {
                timestamp: base + Duration::days(i as i64),
                open,
                high: open.max(close) + 1.0,
                low: (open.min(close) - 1.0).max(0.01),
                close,
                volume: 1_000.0 + (i % 7) as f64 * 100.0,
            }
        })
        .collect()
}

pub fn flat_bars(n: usize, price: f64) -> Vec<Bar> {
    bars_from_closes(&vec![price; n])
}

/// Trending sine wave, long enough to clear every default lookback.
pub fn wave_bars(n: usize) -> Vec<Bar> {
    let closes: Vec<f64> = (0..n)
        .map(|i| {
            let t = i as f64;
            100.0 + t * 0.05 + (t * 0.15).sin() * 8.0 + (t * 0.6).cos() * 2.0
        })
        .collect();
    bars_from_closes(&closes)
}

pub fn signals(raw: &[i8]) -> SignalSeries {
    raw.iter()
        .map(|&v| Signal::from_i8(v).expect("signal in {-1, 0, 1}"))
        .collect()
}

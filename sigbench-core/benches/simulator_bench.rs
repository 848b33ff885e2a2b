//! Criterion benchmarks for the signal → simulation hot path.
//!
//! 1. Portfolio simulator loop over a pre-computed signal
//! 2. Component computation for each indicator kind
//! 3. Strategy evaluation over cached components
//! 4. Bar fingerprinting

use std::collections::BTreeMap;

use chrono::{Duration, TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use sigbench_core::components::{create_indicator, IndicatorKind, SignalProvider};
use sigbench_core::domain::{Bar, Signal, SignalSeries};
use sigbench_core::fingerprint::Fingerprint;
use sigbench_core::{PortfolioSimulator, SimulationConfig};

// ── Helpers ──────────────────────────────────────────────────────────

fn make_bars(n: usize) -> Vec<Bar> {
    let base = Utc.with_ymd_and_hms(2020, 1, 2, 0, 0, 0).unwrap();
    (0..n)
        .map(|i| {
            let close = 100.0 + (i as f64 * 0.1).sin() * 10.0;
            Bar {
                timestamp: base + Duration::days(i as i64),
                open: close - 0.3,
                high: close + 1.5,
                low: close - 1.5,
                close,
                volume: 1_000_000.0 + (i % 500) as f64,
            }
        })
        .collect()
}

fn alternating_signal(n: usize) -> SignalSeries {
    (0..n)
        .map(|i| match i % 20 {
            0 => Signal::Buy,
            10 => Signal::Sell,
            _ => Signal::Hold,
        })
        .collect()
}

// ── 1. Simulator ─────────────────────────────────────────────────────

fn bench_simulator(c: &mut Criterion) {
    let mut group = c.benchmark_group("simulator");
    for n in [1_000usize, 10_000] {
        let bars = make_bars(n);
        let signal = alternating_signal(n);
        let sim = PortfolioSimulator::new(SimulationConfig {
            take_profit_multiplier: 1.0,
            backoff: 2,
            ..Default::default()
        })
        .unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, _| {
            b.iter(|| sim.run(black_box(&bars), black_box(&signal)).unwrap())
        });
    }
    group.finish();
}

// ── 2. Components ────────────────────────────────────────────────────

fn bench_components(c: &mut Criterion) {
    let bars = make_bars(2_520);
    let mut group = c.benchmark_group("components");
    for kind in IndicatorKind::ALL {
        let indicator = create_indicator(kind, &BTreeMap::new()).unwrap();
        group.bench_function(kind.name(), |b| b.iter(|| indicator.compute(black_box(&bars))));
    }
    group.finish();
}

// ── 3. Strategy evaluation ───────────────────────────────────────────

fn bench_strategies(c: &mut Criterion) {
    let bars = make_bars(2_520);
    let mut provider =
        SignalProvider::new(IndicatorKind::Ichimoku, Some("KumoChikou"), &BTreeMap::new()).unwrap();
    // warm the memo so only the predicate table is measured
    provider.calculate(&bars).unwrap();
    c.bench_function("strategy_evaluate_cached", |b| {
        b.iter(|| provider.calculate(black_box(&bars)).unwrap())
    });
}

// ── 4. Fingerprint ───────────────────────────────────────────────────

fn bench_fingerprint(c: &mut Criterion) {
    let bars = make_bars(10_000);
    c.bench_function("fingerprint_10k_bars", |b| {
        b.iter(|| Fingerprint::of_bars(black_box(&bars)))
    });
}

criterion_group!(
    benches,
    bench_simulator,
    bench_components,
    bench_strategies,
    bench_fingerprint
);
criterion_main!(benches);

//! Parabolic SAR — Wilder's acceleration factor system.
//!
//! Inherently sequential/stateful: maintains direction, extreme point (EP),
//! and acceleration factor (AF). The output is split into a long leg (SAR
//! while trending up, NaN otherwise) and a short leg (SAR while trending down).
//!
//! Lookback: 1 (needs at least 2 bars to start).

use crate::domain::Bar;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PsarParams {
    pub af_start: f64,
    pub af_step: f64,
    pub af_max: f64,
}

impl Default for PsarParams {
    fn default() -> Self {
        Self {
            af_start: 0.02,
            af_step: 0.02,
            af_max: 0.20,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PsarSeries {
    pub sar: Vec<f64>,
    pub long: Vec<f64>,
    pub short: Vec<f64>,
}

pub fn parabolic_sar(bars: &[Bar], params: PsarParams) -> PsarSeries {
    let n = bars.len();
    let mut out = PsarSeries {
        sar: vec![f64::NAN; n],
        long: vec![f64::NAN; n],
        short: vec![f64::NAN; n],
    };

    if n < 2 {
        return out;
    }
    if bars[..2]
        .iter()
        .any(|b| b.high.is_nan() || b.low.is_nan() || b.close.is_nan())
    {
        return out;
    }

    // Initial direction from the first two closes
    let mut is_long = bars[1].close >= bars[0].close;
    let mut af = params.af_start;
    let (mut sar, mut ep) = if is_long {
        (bars[0].low, bars[1].high)
    } else {
        (bars[0].high, bars[1].low)
    };
    record(&mut out, 1, sar, is_long);

    for i in 2..n {
        let bar = &bars[i];
        if bar.high.is_nan() || bar.low.is_nan() || bar.close.is_nan() {
            continue;
        }

        let mut new_sar = sar + af * (ep - sar);

        if is_long {
            // SAR may not rise above the two previous lows
            new_sar = new_sar.min(bars[i - 1].low).min(bars[i - 2].low);
            if bar.low < new_sar {
                is_long = false;
                new_sar = ep;
                ep = bar.low;
                af = params.af_start;
            } else if bar.high > ep {
                ep = bar.high;
                af = (af + params.af_step).min(params.af_max);
            }
        } else {
            // SAR may not fall below the two previous highs
            new_sar = new_sar.max(bars[i - 1].high).max(bars[i - 2].high);
            if bar.high > new_sar {
                is_long = true;
                new_sar = ep;
                ep = bar.high;
                af = params.af_start;
            } else if bar.low < ep {
                ep = bar.low;
                af = (af + params.af_step).min(params.af_max);
            }
        }

        sar = new_sar;
        record(&mut out, i, sar, is_long);
    }

    out
}

fn record(out: &mut PsarSeries, i: usize, sar: f64, is_long: bool) {
    out.sar[i] = sar;
    if is_long {
        out.long[i] = sar;
    } else {
        out.short[i] = sar;
    }
}
